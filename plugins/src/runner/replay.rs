use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use speedprobe_core::api::{ReplayRunnerConfig, RunnerPlugin, RunnerSession, RunnerStartArgs};

type Reader = Box<dyn tokio::io::AsyncRead + Unpin + Send>;

/// Plays back a recorded speedtest run from files instead of spawning the tool.
///
/// `events_file` stands in for stdout, `stderr_file` (optional) for stderr, and
/// the session "exits" with the configured code. The start args are ignored.
pub struct ReplayRunnerPlugin {
    events_file: PathBuf,
    stderr_file: Option<PathBuf>,
    exit_code: i32,
}

impl ReplayRunnerPlugin {
    pub fn new(cfg: &ReplayRunnerConfig) -> Self {
        Self {
            events_file: PathBuf::from(&cfg.events_file),
            stderr_file: cfg.stderr_file.as_ref().map(PathBuf::from),
            exit_code: cfg.exit_code,
        }
    }
}

#[async_trait]
impl RunnerPlugin for ReplayRunnerPlugin {
    fn name(&self) -> &str {
        "replay"
    }

    async fn start_session(&self, _args: &RunnerStartArgs) -> Result<Box<dyn RunnerSession>> {
        let stdout = tokio::fs::File::open(&self.events_file)
            .await
            .with_context(|| format!("failed to open replay file {}", self.events_file.display()))?;
        let stderr: Reader = match &self.stderr_file {
            Some(path) => Box::new(
                tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("failed to open replay stderr {}", path.display()))?,
            ),
            None => Box::new(tokio::io::empty()),
        };
        tracing::debug!(target: "speedprobe.plugin", file = %self.events_file.display(), "replaying recorded run");

        Ok(Box::new(ReplaySession {
            stdout: Some(Box::new(stdout)),
            stderr: Some(stderr),
            exit_code: self.exit_code,
        }))
    }
}

struct ReplaySession {
    stdout: Option<Reader>,
    stderr: Option<Reader>,
    exit_code: i32,
}

#[async_trait]
impl RunnerSession for ReplaySession {
    fn stdout(&mut self) -> Option<Reader> {
        self.stdout.take()
    }

    fn stderr(&mut self) -> Option<Reader> {
        self.stderr.take()
    }

    async fn wait(&mut self) -> Result<i32> {
        Ok(self.exit_code)
    }
}
