use std::collections::HashMap;

use async_trait::async_trait;

/// How to launch the measurement tool.
#[derive(Debug, Clone, Default)]
pub struct RunnerStartArgs {
    pub cmd: String,
    pub args: Vec<String>,
    pub envs: HashMap<String, String>,
}

/// A started measurement process, seen only through its streams and exit code.
#[async_trait]
pub trait RunnerSession: Send {
    fn stdout(&mut self) -> Option<Box<dyn tokio::io::AsyncRead + Unpin + Send>>;

    fn stderr(&mut self) -> Option<Box<dyn tokio::io::AsyncRead + Unpin + Send>>;

    /// Waits for termination and returns the normalized exit code.
    async fn wait(&mut self) -> anyhow::Result<i32>;
}

#[async_trait]
pub trait RunnerPlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn start_session(&self, args: &RunnerStartArgs)
        -> anyhow::Result<Box<dyn RunnerSession>>;
}
