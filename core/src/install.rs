use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::InstallError;

/// Resolves the on-disk speedtest binary, fetching it first if needed.
///
/// Implementations must be idempotent: once the binary exists, calls return its
/// path without touching the network.
#[async_trait]
pub trait BinaryProvider: Send + Sync {
    async fn ensure_binary(&self) -> Result<PathBuf, InstallError>;
}

/// A binary that is known to exist already (or is not a real binary at all, as
/// with replayed runs).
pub struct PresetBinary(pub PathBuf);

#[async_trait]
impl BinaryProvider for PresetBinary {
    async fn ensure_binary(&self) -> Result<PathBuf, InstallError> {
        Ok(self.0.clone())
    }
}
