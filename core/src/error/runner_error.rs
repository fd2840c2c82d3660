// core/src/error/runner_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("session did not expose its {stream} stream")]
    MissingStream { stream: &'static str },

    #[error("failed waiting for process exit")]
    Wait(#[source] anyhow::Error),
}
