// core/src/error/parse_error.rs
use thiserror::Error;

/// Why a single output line of the speedtest CLI produced no event.
///
/// Never escalated past the parser: callers log it and move on.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json line")]
    InvalidJson(#[source] serde_json::Error),

    #[error("record has no `type` discriminator")]
    MissingType,

    #[error("unknown record type: {0}")]
    UnknownType(String),
}
