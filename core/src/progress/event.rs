use serde::Serialize;

use crate::measurement::MeasurementResult;

/// One typed step of a running measurement, decoded from a single output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    ServerSelected(String),
    PingStarted,
    DownloadSample {
        progress: f64,
        bandwidth_bytes_per_sec: f64,
    },
    UploadSample {
        progress: f64,
        bandwidth_bytes_per_sec: f64,
    },
    RateLimited,
    FinalResult(Box<MeasurementResult>),
}
