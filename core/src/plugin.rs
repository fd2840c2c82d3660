use chrono::{DateTime, Utc};

use crate::cache::CacheDecision;
use crate::presenter::{present, DisplayRow, RowAction};
use crate::runner::MeasurementRunner;

const ICON_DARK: &str = "icon-dark.png";
const ICON_LIGHT: &str = "icon-light.png";

/// Query-path entry point the host calls for every keystroke and forced re-query.
///
/// Never blocks: the only side effect beyond reading state is kicking off a
/// background run when nothing is cached and the query is blank.
#[derive(Clone)]
pub struct SpeedTestPlugin {
    runner: MeasurementRunner,
}

impl SpeedTestPlugin {
    pub fn new(runner: MeasurementRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &MeasurementRunner {
        &self.runner
    }

    pub fn query(&self, raw_query: &str) -> Vec<DisplayRow> {
        self.query_at(raw_query, Utc::now())
    }

    pub fn query_at(&self, raw_query: &str, now: DateTime<Utc>) -> Vec<DisplayRow> {
        let decision = self.runner.on_query(now);
        if matches!(decision, CacheDecision::Idle) && raw_query.trim().is_empty() {
            self.runner.request_start();
        }

        let icon = if self.runner.host().is_dark_theme() {
            ICON_DARK
        } else {
            ICON_LIGHT
        };
        present(&decision, raw_query)
            .into_iter()
            .map(|mut row| {
                row.icon_path = Some(icon.to_string());
                row
            })
            .collect()
    }

    /// Runs a row action. Returns whether the host should hide its window.
    pub fn execute(&self, action: &RowAction) -> bool {
        match action {
            RowAction::Retest => {
                self.runner.clear_cache();
                self.runner.request_start();
                false
            }
            RowAction::Start => {
                self.runner.request_start();
                false
            }
            RowAction::OpenUrl { url } => match self.runner.host().open_url(url) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(target: "speedprobe.plugin", url = %url, error = %e, "failed to open result url");
                    self.runner.host().show_msg("Could not open the result page");
                    false
                }
            },
        }
    }
}
