// core/src/error/cli_error.rs
use thiserror::Error;

use super::InstallError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[source] anyhow::Error),

    #[error("install error: {0}")]
    Install(#[from] InstallError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
