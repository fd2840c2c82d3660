use chrono::{DateTime, Utc};

use crate::measurement::bytes_to_mbps;
use crate::progress::ProgressEvent;

pub const STATUS_CONNECTING: &str = "Connecting to server...";
pub const STATUS_RATE_LIMITED: &str = "⚠️ Rate limit reached - wait a few minutes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl RunPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, RunPhase::Running)
    }
}

/// Live state of the current (or last) measurement run.
///
/// Written only by the run worker; the query path reads snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub phase: RunPhase,
    pub run_id: Option<String>,
    pub status_text: Option<String>,
    pub download_progress_pct: f64,
    pub upload_progress_pct: f64,
    pub download_speed_mbps: f64,
    pub upload_speed_mbps: f64,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunState {
    /// Resets progress and enters `Running`. Returns false if a run is already active.
    pub fn begin(&mut self, run_id: String) -> bool {
        if self.phase.is_active() {
            return false;
        }
        *self = RunState {
            phase: RunPhase::Running,
            run_id: Some(run_id),
            status_text: Some(STATUS_CONNECTING.to_string()),
            ..RunState::default()
        };
        true
    }

    /// Applies one event. Ignored unless the run is active.
    pub fn apply(&mut self, ev: &ProgressEvent) {
        if !self.phase.is_active() {
            return;
        }
        match ev {
            ProgressEvent::ServerSelected(name) => {
                let name = if name.trim().is_empty() {
                    "server"
                } else {
                    name.as_str()
                };
                self.status_text = Some(format!("Testing with {name}"));
            }
            ProgressEvent::PingStarted => {
                self.status_text = Some("Testing ping...".to_string());
            }
            ProgressEvent::DownloadSample {
                progress,
                bandwidth_bytes_per_sec,
            } => {
                self.status_text = Some("Testing download...".to_string());
                self.download_progress_pct =
                    raise_pct(self.download_progress_pct, progress * 100.0);
                self.download_speed_mbps = bytes_to_mbps(*bandwidth_bytes_per_sec);
            }
            ProgressEvent::UploadSample {
                progress,
                bandwidth_bytes_per_sec,
            } => {
                // Upload only starts once download is done.
                self.status_text = Some("Testing upload...".to_string());
                self.download_progress_pct = 100.0;
                self.upload_progress_pct = raise_pct(self.upload_progress_pct, progress * 100.0);
                self.upload_speed_mbps = bytes_to_mbps(*bandwidth_bytes_per_sec);
            }
            ProgressEvent::RateLimited => {
                self.status_text = Some(STATUS_RATE_LIMITED.to_string());
            }
            ProgressEvent::FinalResult(_) => {}
        }
    }

    /// Moves to `Completed`/`Failed` and stamps `completed_at`. No-op unless running.
    pub fn finish(&mut self, succeeded: bool, now: DateTime<Utc>) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        self.phase = if succeeded {
            RunPhase::Completed
        } else {
            RunPhase::Failed
        };
        self.status_text = None;
        self.completed_at = Some(now);
        true
    }
}

fn raise_pct(current: f64, sample: f64) -> f64 {
    let sample = if sample.is_finite() {
        sample.clamp(0.0, 100.0)
    } else {
        0.0
    };
    current.max(sample)
}
