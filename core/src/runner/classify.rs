use crate::measurement::{Failure, FailureReason, MeasurementResult};
use crate::progress::is_rate_limit_text;

use super::process::ExitOutcome;

/// Maps the tool's diagnostic text onto a failure reason.
///
/// `rate_limited` carries the stderr side-channel signal seen during the run.
pub fn classify_failure(diagnostic: &str, rate_limited: bool) -> FailureReason {
    if rate_limited || is_rate_limit_text(diagnostic) {
        FailureReason::RateLimited
    } else if diagnostic.contains("Configuration") && diagnostic.contains("Timeout") {
        FailureReason::ConnectionTimeout
    } else if diagnostic.contains("Configuration") {
        FailureReason::ServerUnreachable
    } else {
        FailureReason::GenericFailure
    }
}

/// Final verdict of a run.
///
/// A `result` record seen on stdout wins over the exit code. Without one the run
/// failed, even if the process exited 0.
pub fn resolve_outcome(
    final_result: Option<MeasurementResult>,
    rate_limited: bool,
    exit: &ExitOutcome,
) -> Result<MeasurementResult, Failure> {
    if let Some(result) = final_result {
        if exit.exit_code != 0 {
            tracing::warn!(
                target: "speedprobe.runner",
                exit_code = exit.exit_code,
                "tool exited non-zero after emitting its result record; keeping the result"
            );
        }
        return Ok(result);
    }

    let reason = classify_failure(&exit.diagnostic_text, rate_limited);
    let diagnostic = if exit.diagnostic_text.trim().is_empty() {
        format!("exit code {} without a result record", exit.exit_code)
    } else {
        exit.diagnostic_text.clone()
    };
    Err(Failure::new(reason, diagnostic))
}
