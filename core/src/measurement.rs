use serde::{Deserialize, Serialize};

/// Bytes per second in one megabit per second.
pub const BYTES_PER_SEC_PER_MBPS: f64 = 125_000.0;

pub fn bytes_to_mbps(bytes_per_sec: f64) -> f64 {
    bytes_per_sec / BYTES_PER_SEC_PER_MBPS
}

/// Outcome of one successful measurement, built from the tool's `result` record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
    pub download_jitter_ms: f64,
    pub download_latency_ms: f64,
    pub upload_jitter_ms: f64,
    pub upload_latency_ms: f64,
    pub server_name: String,
    pub server_location: String,
    pub isp: String,
    pub result_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    BinaryUnavailable,
    RateLimited,
    ConnectionTimeout,
    ServerUnreachable,
    GenericFailure,
}

impl FailureReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureReason::BinaryUnavailable => {
                "Speedtest CLI unavailable - could not download or extract it"
            }
            FailureReason::RateLimited => {
                "Rate limit reached - wait a few minutes or change your IP"
            }
            FailureReason::ConnectionTimeout => {
                "Connection timeout - check your internet or try again"
            }
            FailureReason::ServerUnreachable => {
                "Cannot connect to Speedtest servers - check your connection"
            }
            FailureReason::GenericFailure => "Test failed - check your internet connection",
        }
    }
}

/// Outcome of one failed measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub reason: FailureReason,
    /// Raw diagnostic text (stderr of the tool, or the install/spawn error chain).
    pub diagnostic: String,
}

impl Failure {
    pub fn new(reason: FailureReason, diagnostic: impl Into<String>) -> Self {
        Self {
            reason,
            diagnostic: diagnostic.into(),
        }
    }

    /// Friendly message with the raw diagnostic appended, flattened onto one line.
    pub fn display_message(&self) -> String {
        let base = self.reason.user_message();
        let detail = self
            .diagnostic
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if detail.is_empty() {
            base.to_string()
        } else {
            format!("{base} ({detail})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_bytes_per_second_to_mbps() {
        assert_eq!(bytes_to_mbps(12_500_000.0), 100.0);
        assert_eq!(bytes_to_mbps(6_250_000.0), 50.0);
        assert_eq!(bytes_to_mbps(0.0), 0.0);
    }

    #[test]
    fn display_message_appends_whole_diagnostic() {
        let f = Failure::new(
            FailureReason::RateLimited,
            "[error] first\n[error] Limit reached: too many tests\n\n",
        );
        assert_eq!(
            f.display_message(),
            "Rate limit reached - wait a few minutes or change your IP ([error] first [error] Limit reached: too many tests)"
        );
    }

    #[test]
    fn display_message_without_diagnostic_is_plain() {
        let f = Failure::new(FailureReason::GenericFailure, "  \n");
        assert_eq!(
            f.display_message(),
            "Test failed - check your internet connection"
        );
    }

    #[test]
    fn long_diagnostics_are_kept_in_full() {
        let f = Failure::new(FailureReason::GenericFailure, "x".repeat(400));
        let msg = f.display_message();
        assert!(msg.ends_with(&format!("({})", "x".repeat(400))));
    }
}
