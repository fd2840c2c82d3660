// core/src/error/install_error.rs
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("download of {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("download of {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("download of {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to extract {archive}")]
    Extract {
        archive: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive did not contain {0}")]
    BinaryMissing(PathBuf),
}
