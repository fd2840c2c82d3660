mod rows;

pub use rows::{DisplayRow, RowAction};

use crate::cache::CacheDecision;
use crate::measurement::{Failure, MeasurementResult};
use crate::runner::RunState;

pub const STARTING_TITLE: &str = "Testing your internet speed...";
pub const STARTING_SUBTITLE: &str = "Connecting to nearest server...";
pub const FINDING_SERVER: &str = "Finding best server...";

/// Maps a cache decision and the raw query text to display rows.
///
/// Pure: no I/O, no clock, no state. The caller has already started a run when
/// the decision is `Idle` and the query is blank.
pub fn present(decision: &CacheDecision, raw_query: &str) -> Vec<DisplayRow> {
    match decision {
        CacheDecision::ShowProgress(state) => vec![progress_row(state)],
        CacheDecision::ShowResult { result, age } => result_rows(result, *age),
        CacheDecision::ShowFailure(failure) => vec![failure_row(failure)],
        CacheDecision::Idle if raw_query.trim().is_empty() => {
            vec![DisplayRow::new(STARTING_TITLE, STARTING_SUBTITLE)]
        }
        CacheDecision::Idle => vec![DisplayRow::new(
            "Run a speed test",
            "Press Enter to measure download, upload and ping",
        )
        .with_action(RowAction::Start)],
    }
}

fn progress_row(state: &RunState) -> DisplayRow {
    let title = state
        .status_text
        .clone()
        .unwrap_or_else(|| crate::runner::STATUS_CONNECTING.to_string());
    DisplayRow::new(title, progress_line(state))
}

/// Subtitle for a running measurement: the most advanced direction wins.
pub fn progress_line(state: &RunState) -> String {
    if state.upload_progress_pct > 0.0 {
        format!(
            "↑ Upload: {:.1} Mbps ({:.0}%)",
            state.upload_speed_mbps, state.upload_progress_pct
        )
    } else if state.download_progress_pct > 0.0 {
        format!(
            "↓ Download: {:.1} Mbps ({:.0}%)",
            state.download_speed_mbps, state.download_progress_pct
        )
    } else {
        FINDING_SERVER.to_string()
    }
}

fn result_rows(result: &MeasurementResult, age: chrono::Duration) -> Vec<DisplayRow> {
    let server = if result.server_name.trim().is_empty() {
        "Unknown"
    } else {
        result.server_name.as_str()
    };

    let mut rows = vec![
        DisplayRow::new(
            format!(
                "↓ {:.1} Mbps  ↑ {:.1} Mbps",
                result.download_mbps, result.upload_mbps
            ),
            format!(
                "Ping: {:.0} ms • {} • {} • Enter to retest",
                result.ping_ms,
                server,
                format_age(age)
            ),
        )
        .with_action(RowAction::Retest),
        DisplayRow::new(
            format!("↓ Download: {:.2} Mbps", result.download_mbps),
            format!(
                "Jitter: {:.1} ms • Latency: {:.1} ms",
                result.download_jitter_ms, result.download_latency_ms
            ),
        ),
        DisplayRow::new(
            format!("↑ Upload: {:.2} Mbps", result.upload_mbps),
            format!(
                "Jitter: {:.1} ms • Latency: {:.1} ms",
                result.upload_jitter_ms, result.upload_latency_ms
            ),
        ),
        DisplayRow::new(
            format!("📍 {server}"),
            format!("{} • ISP: {}", result.server_location, result.isp),
        ),
    ];

    if let Some(url) = result.result_url.as_deref().filter(|u| !u.is_empty()) {
        rows.push(
            DisplayRow::new("View detailed results online", url).with_action(RowAction::OpenUrl {
                url: url.to_string(),
            }),
        );
    }
    rows
}

fn failure_row(failure: &Failure) -> DisplayRow {
    DisplayRow::new(
        "⚠️ Speed test failed",
        format!("{} • Enter to retry", failure.display_message()),
    )
    .with_action(RowAction::Retest)
}

/// "12m ago" under an hour, "3h ago" beyond.
pub fn format_age(age: chrono::Duration) -> String {
    let minutes = age.num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m ago")
    } else {
        format!("{}h ago", age.num_hours())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::FailureReason;
    use pretty_assertions::assert_eq;

    fn sample_result(url: Option<&str>) -> MeasurementResult {
        MeasurementResult {
            download_mbps: 100.0,
            upload_mbps: 50.0,
            ping_ms: 15.0,
            download_jitter_ms: 1.2,
            download_latency_ms: 20.0,
            upload_jitter_ms: 2.5,
            upload_latency_ms: 30.0,
            server_name: "X".to_string(),
            server_location: "Y".to_string(),
            isp: "Z".to_string(),
            result_url: url.map(str::to_string),
        }
    }

    #[test]
    fn progress_row_prefers_upload_then_download_then_server_search() {
        let mut state = RunState::default();
        assert!(state.begin("r".to_string()));
        let rows = present(&CacheDecision::ShowProgress(state.clone()), "");
        assert_eq!(
            rows,
            vec![DisplayRow::new("Connecting to server...", FINDING_SERVER)]
        );

        state.status_text = Some("Testing download...".to_string());
        state.download_progress_pct = 42.4;
        state.download_speed_mbps = 87.26;
        let rows = present(&CacheDecision::ShowProgress(state.clone()), "");
        assert_eq!(rows[0].subtitle, "↓ Download: 87.3 Mbps (42%)");

        state.upload_progress_pct = 10.0;
        state.upload_speed_mbps = 12.0;
        let rows = present(&CacheDecision::ShowProgress(state), "");
        assert_eq!(rows[0].subtitle, "↑ Upload: 12.0 Mbps (10%)");
        assert_eq!(rows[0].action, None);
    }

    #[test]
    fn result_rows_without_url() {
        let rows = present(
            &CacheDecision::ShowResult {
                result: sample_result(None),
                age: chrono::Duration::minutes(5),
            },
            "",
        );
        assert_eq!(
            rows,
            vec![
                DisplayRow::new(
                    "↓ 100.0 Mbps  ↑ 50.0 Mbps",
                    "Ping: 15 ms • X • 5m ago • Enter to retest"
                )
                .with_action(RowAction::Retest),
                DisplayRow::new(
                    "↓ Download: 100.00 Mbps",
                    "Jitter: 1.2 ms • Latency: 20.0 ms"
                ),
                DisplayRow::new("↑ Upload: 50.00 Mbps", "Jitter: 2.5 ms • Latency: 30.0 ms"),
                DisplayRow::new("📍 X", "Y • ISP: Z"),
            ]
        );
    }

    #[test]
    fn result_rows_with_url_add_open_row() {
        let url = "https://www.speedtest.net/result/c/abc";
        let rows = present(
            &CacheDecision::ShowResult {
                result: sample_result(Some(url)),
                age: chrono::Duration::hours(2),
            },
            "",
        );
        assert_eq!(rows.len(), 5);
        assert!(rows[0].subtitle.contains("2h ago"));
        assert_eq!(
            rows[4],
            DisplayRow::new("View detailed results online", url).with_action(RowAction::OpenUrl {
                url: url.to_string()
            })
        );
    }

    #[test]
    fn failure_row_offers_retry() {
        let failure = Failure::new(FailureReason::RateLimited, "[error] Limit reached\n");
        let rows = present(&CacheDecision::ShowFailure(failure), "");
        assert_eq!(
            rows,
            vec![DisplayRow::new(
                "⚠️ Speed test failed",
                "Rate limit reached - wait a few minutes or change your IP ([error] Limit reached) • Enter to retry"
            )
            .with_action(RowAction::Retest)]
        );
    }

    #[test]
    fn idle_rows_depend_on_query() {
        assert_eq!(
            present(&CacheDecision::Idle, "  "),
            vec![DisplayRow::new(STARTING_TITLE, STARTING_SUBTITLE)]
        );
        let rows = present(&CacheDecision::Idle, "again");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, Some(RowAction::Start));
    }

    #[test]
    fn age_formatting() {
        assert_eq!(format_age(chrono::Duration::seconds(30)), "0m ago");
        assert_eq!(format_age(chrono::Duration::minutes(59)), "59m ago");
        assert_eq!(format_age(chrono::Duration::minutes(60)), "1h ago");
        assert_eq!(format_age(chrono::Duration::minutes(185)), "3h ago");
    }
}
