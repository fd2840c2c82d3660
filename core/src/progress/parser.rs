use crate::error::ParseError;

use super::event::ProgressEvent;
use super::record::SpeedtestRecord;

/// Stderr phrases the speedtest CLI prints when the remote service throttles us.
pub const RATE_LIMIT_PHRASES: [&str; 2] = ["Limit reached", "Too many requests"];

pub fn is_rate_limit_text(text: &str) -> bool {
    RATE_LIMIT_PHRASES.iter().any(|p| text.contains(p))
}

/// Decodes the JSON-lines stream of `speedtest --format=json --progress=yes`.
///
/// Stateless and best-effort:
/// - Blank and non-JSON lines are ignored.
/// - Unknown record types are ignored.
/// - Nothing here ever aborts a run; failures are logged at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressEventParser;

impl ProgressEventParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_line(&self, line: &str) -> Option<ProgressEvent> {
        let s = line.trim();
        if s.is_empty() {
            return None;
        }
        match self.try_parse_line(s) {
            Ok(ev) => Some(ev),
            Err(err) => {
                tracing::debug!(
                    target: "speedprobe.parser",
                    error = %err,
                    line = %shorten(s),
                    "skipping output line"
                );
                None
            }
        }
    }

    /// Like [`parse_line`](Self::parse_line) but keeps the reason a line was dropped.
    pub fn try_parse_line(&self, line: &str) -> Result<ProgressEvent, ParseError> {
        let record: SpeedtestRecord =
            serde_json::from_str(line.trim()).map_err(ParseError::InvalidJson)?;

        let Some(record_type) = record.record_type.as_deref() else {
            return Err(ParseError::MissingType);
        };

        let ev = match record_type {
            "testStart" => ProgressEvent::ServerSelected(record.server_name()),
            "ping" => ProgressEvent::PingStarted,
            "download" => {
                let (progress, bandwidth) = record.download_sample();
                ProgressEvent::DownloadSample {
                    progress,
                    bandwidth_bytes_per_sec: bandwidth,
                }
            }
            "upload" => {
                let (progress, bandwidth) = record.upload_sample();
                ProgressEvent::UploadSample {
                    progress,
                    bandwidth_bytes_per_sec: bandwidth,
                }
            }
            "result" => ProgressEvent::FinalResult(Box::new(record.to_result())),
            other => return Err(ParseError::UnknownType(other.to_string())),
        };
        Ok(ev)
    }

    /// Side channel: a stderr line mentioning throttling becomes a synthetic event.
    pub fn scan_diagnostic_line(&self, line: &str) -> Option<ProgressEvent> {
        is_rate_limit_text(line).then_some(ProgressEvent::RateLimited)
    }
}

fn shorten(s: &str) -> String {
    if s.chars().count() <= 140 {
        s.to_string()
    } else {
        s.chars().take(138).collect::<String>() + "…"
    }
}
