use std::io::{Read, Write};
use std::sync::Arc;

use tokio::sync::mpsc;

use speedprobe_core::api::{
    AppConfig, CliError, DisplayRow, MeasurementRunner, ProgressEventParser, RunPhase,
    SpeedTestPlugin,
};
use speedprobe_plugins::factory;

use crate::host::{strip_keyword, QueryChange, TerminalHost};

/// Drives the plugin the way a launcher would until the run (if any) settles.
///
/// Exit code: 0 after a successful run or when nothing ran, 1 after a failed run,
/// 130 when interrupted.
pub async fn run_watch(cfg: &AppConfig, query: String) -> Result<i32, CliError> {
    let (host, changes) = TerminalHost::new(&cfg.host);
    let services = factory::build_services(cfg, Arc::new(host)).map_err(CliError::Config)?;
    let runner = MeasurementRunner::new(cfg, services);
    let mut view = RowPrinter::new(std::io::stdout());
    watch(&runner, changes, &cfg.host.action_keyword, &query, &mut view).await
}

/// Re-renders on every forced re-query and returns once the run's teardown
/// refresh (the bare keyword) has been rendered.
async fn watch<W: Write>(
    runner: &MeasurementRunner,
    mut changes: mpsc::UnboundedReceiver<QueryChange>,
    keyword: &str,
    query: &str,
    view: &mut RowPrinter<W>,
) -> Result<i32, CliError> {
    let plugin = SpeedTestPlugin::new(runner.clone());
    view.render(&plugin.query(query))?;
    if runner.snapshot().phase == RunPhase::Idle {
        return Ok(0);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                view.render(&plugin.query(strip_keyword(keyword, &change.query)))?;
                if change.requery && change.query == keyword && !runner.is_running() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!(target: "speedprobe.runner", "interrupted");
                return Ok(130);
            }
        }
    }

    Ok(match runner.snapshot().phase {
        RunPhase::Completed => 0,
        _ => 1,
    })
}

pub async fn run_install(cfg: &AppConfig) -> Result<i32, CliError> {
    let installer = factory::build_installer(cfg).map_err(CliError::Config)?;
    let path = installer.ensure_binary().await?;
    println!("{}", path.display());
    Ok(0)
}

/// Prints one JSON event per decodable line; rejected lines are reported on stderr.
pub fn run_parse(file: &str) -> Result<i32, CliError> {
    let text = if file == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        s
    } else {
        std::fs::read_to_string(file)?
    };

    let parser = ProgressEventParser::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parser.try_parse_line(line) {
            Ok(ev) => println!("{}", serde_json::to_string(&ev).map_err(std::io::Error::from)?),
            Err(err) => match parser.scan_diagnostic_line(line) {
                Some(ev) => {
                    println!("{}", serde_json::to_string(&ev).map_err(std::io::Error::from)?)
                }
                None => eprintln!("line {}: skipped ({err})", idx + 1),
            },
        }
    }
    Ok(0)
}

/// Prints rows, skipping repaints that would show exactly what is already there.
struct RowPrinter<W> {
    out: W,
    last: Option<String>,
}

impl<W: Write> RowPrinter<W> {
    fn new(out: W) -> Self {
        Self { out, last: None }
    }

    fn render(&mut self, rows: &[DisplayRow]) -> std::io::Result<()> {
        let text = format_rows(rows);
        if self.last.as_deref() == Some(text.as_str()) {
            return Ok(());
        }
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        self.last = Some(text);
        Ok(())
    }
}

fn format_rows(rows: &[DisplayRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.action.is_some() { "↵ " } else { "  " };
        out.push_str(&format!("{marker}{}\n    {}\n", row.title, row.subtitle));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use speedprobe_core::api::{ReplayRunnerConfig, RowAction, RunnerConfig};

    #[test]
    fn rows_with_actions_are_marked() {
        let rows = vec![
            DisplayRow::new("↓ 100.0 Mbps  ↑ 50.0 Mbps", "Ping: 15 ms")
                .with_action(RowAction::Retest),
            DisplayRow::new("📍 X", "Y • ISP: Z"),
        ];
        assert_eq!(
            format_rows(&rows),
            "↵ ↓ 100.0 Mbps  ↑ 50.0 Mbps\n    Ping: 15 ms\n  📍 X\n    Y • ISP: Z\n"
        );
    }

    #[test]
    fn identical_repaints_are_skipped() {
        let mut view = RowPrinter::new(Vec::new());
        let rows = vec![DisplayRow::new("Testing ping...", "Finding best server...")];
        view.render(&rows).unwrap();
        view.render(&rows).unwrap();
        let printed = String::from_utf8(view.out).unwrap();
        assert_eq!(printed.matches("Testing ping...").count(), 1);
    }

    const RECORDED_RUN: &str = concat!(
        r#"{"type":"testStart","server":{"name":"X"}}"#,
        "\n",
        r#"{"type":"result","download":{"bandwidth":12500000},"upload":{"bandwidth":6250000},"ping":{"latency":15},"server":{"name":"X","location":"Y"},"isp":"Z"}"#,
        "\n",
    );

    /// Replays `stdout`/`stderr` through the real factory and watches until it settles.
    async fn watch_replay(
        stdout: &str,
        stderr: &str,
        exit_code: i32,
        query: &str,
    ) -> (i32, String) {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("run.jsonl");
        let errors = dir.path().join("run.err");
        std::fs::write(&events, stdout).unwrap();
        std::fs::write(&errors, stderr).unwrap();

        let mut cfg = AppConfig::default();
        cfg.refresh.interval_ms = 5;
        cfg.refresh.settle_delay_ms = 1;
        cfg.runner = RunnerConfig::Replay(ReplayRunnerConfig {
            events_file: events.to_string_lossy().into_owned(),
            stderr_file: Some(errors.to_string_lossy().into_owned()),
            exit_code,
        });

        let (host, changes) = TerminalHost::new(&cfg.host);
        let services = factory::build_services(&cfg, Arc::new(host)).unwrap();
        let runner = MeasurementRunner::new(&cfg, services);
        let mut view = RowPrinter::new(Vec::new());
        let code = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            watch(&runner, changes, &cfg.host.action_keyword, query, &mut view),
        )
        .await
        .expect("watch did not settle")
        .unwrap();
        (code, String::from_utf8(view.out).unwrap())
    }

    #[tokio::test]
    async fn watch_renders_result_after_fast_run() {
        let (code, printed) = watch_replay(RECORDED_RUN, "", 0, "").await;
        assert_eq!(code, 0);
        assert!(printed.contains("Testing your internet speed..."));
        assert!(printed.contains("↵ ↓ 100.0 Mbps  ↑ 50.0 Mbps"));
        assert!(printed.contains("📍 X"));
    }

    #[tokio::test]
    async fn watch_renders_failure_and_exits_nonzero() {
        let (code, printed) =
            watch_replay("", "[error] Limit reached: Too many tests\n", 1, "").await;
        assert_eq!(code, 1);
        assert!(printed.contains("↵ ⚠️ Speed test failed"));
        assert!(printed.contains("Limit reached: Too many tests"));
    }

    #[tokio::test]
    async fn parameterized_watch_returns_without_running() {
        let (code, printed) = watch_replay(RECORDED_RUN, "", 0, "history").await;
        assert_eq!(code, 0);
        assert!(printed.contains("↵ Run a speed test"));
        assert!(!printed.contains("Mbps"));
    }
}
