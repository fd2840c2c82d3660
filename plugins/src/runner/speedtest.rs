use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::{Child, Command};

use speedprobe_core::api::{normalize_exit, RunnerPlugin, RunnerSession, RunnerStartArgs};

/// Keeps a console window from flashing up behind the launcher.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawns the real speedtest CLI with piped stdout/stderr.
pub struct SpeedtestRunnerPlugin;

impl SpeedtestRunnerPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpeedtestRunnerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunnerPlugin for SpeedtestRunnerPlugin {
    fn name(&self) -> &str {
        "speedtest"
    }

    async fn start_session(&self, args: &RunnerStartArgs) -> Result<Box<dyn RunnerSession>> {
        let mut cmd = Command::new(&args.cmd);
        cmd.args(&args.args)
            .envs(&args.envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", args.cmd))?;
        tracing::debug!(target: "speedprobe.plugin", pid = ?child.id(), cmd = %args.cmd, "speedtest process spawned");

        Ok(Box::new(SpeedtestSession { child }))
    }
}

struct SpeedtestSession {
    child: Child,
}

#[async_trait]
impl RunnerSession for SpeedtestSession {
    fn stdout(&mut self) -> Option<Box<dyn tokio::io::AsyncRead + Unpin + Send>> {
        self.child.stdout.take().map(|s| Box::new(s) as _)
    }

    fn stderr(&mut self) -> Option<Box<dyn tokio::io::AsyncRead + Unpin + Send>> {
        self.child.stderr.take().map(|s| Box::new(s) as _)
    }

    async fn wait(&mut self) -> Result<i32> {
        let status = self
            .child
            .wait()
            .await
            .context("failed to wait on speedtest process")?;
        Ok(normalize_exit(status))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn sh(script: &str) -> RunnerStartArgs {
        RunnerStartArgs {
            cmd: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            ..RunnerStartArgs::default()
        }
    }

    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let plugin = SpeedtestRunnerPlugin::new();
        let mut session = plugin
            .start_session(&sh(r#"echo '{"type":"ping"}'; echo 'Limit reached' >&2; exit 3"#))
            .await
            .unwrap();

        let mut out = String::new();
        session.stdout().unwrap().read_to_string(&mut out).await.unwrap();
        let mut err = String::new();
        session.stderr().unwrap().read_to_string(&mut err).await.unwrap();

        assert_eq!(out, "{\"type\":\"ping\"}\n");
        assert_eq!(err, "Limit reached\n");
        assert_eq!(session.wait().await.unwrap(), 3);
        assert!(session.stdout().is_none());
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let plugin = SpeedtestRunnerPlugin::new();
        let args = RunnerStartArgs {
            cmd: "/nonexistent/speedtest".to_string(),
            ..RunnerStartArgs::default()
        };
        let err = plugin.start_session(&args).await.err().unwrap();
        assert!(format!("{err:#}").contains("failed to spawn /nonexistent/speedtest"));
    }
}
