use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RunnerError;
use crate::progress::{ProgressEvent, ProgressEventParser};

use super::tee::{pump_lines, LineTap, StreamKind};
use super::traits::RunnerSession;

const LINE_CHANNEL_CAPACITY: usize = 1024;

/// What the process left behind once it terminated. Not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    pub exit_code: i32,
    pub diagnostic_text: String,
}

/// One running invocation of the measurement tool.
///
/// Stdout lines are decoded into [`ProgressEvent`]s; stderr lines accumulate in a
/// diagnostic buffer and are scanned for rate-limit phrases.
pub struct MeasurementProcess {
    session: Box<dyn RunnerSession>,
    lines: mpsc::Receiver<LineTap>,
    pumps: Vec<JoinHandle<()>>,
    parser: ProgressEventParser,
    diagnostics: String,
}

impl MeasurementProcess {
    pub fn start(mut session: Box<dyn RunnerSession>) -> Result<Self, RunnerError> {
        let stdout = session
            .stdout()
            .ok_or(RunnerError::MissingStream { stream: "stdout" })?;
        let stderr = session
            .stderr()
            .ok_or(RunnerError::MissingStream { stream: "stderr" })?;

        let (tx, lines) = mpsc::channel::<LineTap>(LINE_CHANNEL_CAPACITY);
        let pumps = vec![
            pump_lines(stdout, StreamKind::Stdout, tx.clone()),
            pump_lines(stderr, StreamKind::Stderr, tx),
        ];

        Ok(Self {
            session,
            lines,
            pumps,
            parser: ProgressEventParser::new(),
            diagnostics: String::new(),
        })
    }

    /// Next event in arrival order; `None` once both streams are closed.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        loop {
            let tap = self.lines.recv().await?;
            match tap.stream {
                StreamKind::Stdout => {
                    if let Some(ev) = self.parser.parse_line(&tap.line) {
                        return Some(ev);
                    }
                }
                StreamKind::Stderr => {
                    if tap.line.trim().is_empty() {
                        continue;
                    }
                    tracing::warn!(target: "speedprobe.runner", "stderr: {}", tap.line);
                    self.diagnostics.push_str(&tap.line);
                    self.diagnostics.push('\n');
                    if let Some(ev) = self.parser.scan_diagnostic_line(&tap.line) {
                        return Some(ev);
                    }
                }
            }
        }
    }

    /// Drains any unread output, then waits for the process to exit.
    pub async fn await_completion(mut self) -> Result<ExitOutcome, RunnerError> {
        while self.next_event().await.is_some() {}
        for pump in self.pumps.drain(..) {
            pump.await.ok();
        }
        let exit_code = self.session.wait().await.map_err(RunnerError::Wait)?;
        Ok(ExitOutcome {
            exit_code,
            diagnostic_text: self.diagnostics,
        })
    }
}
