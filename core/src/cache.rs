use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::measurement::{Failure, MeasurementResult};
use crate::runner::RunState;

#[derive(Debug, Clone, PartialEq)]
pub enum CachedOutcome {
    Result(MeasurementResult),
    Failure(Failure),
}

/// What the query path should show for the current query.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheDecision {
    /// A run is active; carries a snapshot of its progress.
    ShowProgress(RunState),
    ShowResult {
        result: MeasurementResult,
        age: chrono::Duration,
    },
    ShowFailure(Failure),
    /// Nothing cached and nothing running.
    Idle,
}

/// Last run outcome plus the freshness policy deciding when it expires.
///
/// Once the gap between two consecutive queries exceeds `quiet_threshold` and no
/// run is active, the outcome is dropped: the user walked away and came back.
#[derive(Debug, Clone)]
pub struct ResultCache {
    outcome: Option<CachedOutcome>,
    produced_at: Option<DateTime<Utc>>,
    last_query_at: Option<DateTime<Utc>>,
    quiet_threshold: Duration,
}

impl ResultCache {
    pub fn new(quiet_threshold: Duration) -> Self {
        Self {
            outcome: None,
            produced_at: None,
            last_query_at: None,
            quiet_threshold,
        }
    }

    pub fn store_result(&mut self, result: MeasurementResult, now: DateTime<Utc>) {
        self.outcome = Some(CachedOutcome::Result(result));
        self.produced_at = Some(now);
    }

    pub fn store_failure(&mut self, failure: Failure, now: DateTime<Utc>) {
        self.outcome = Some(CachedOutcome::Failure(failure));
        self.produced_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.outcome = None;
        self.produced_at = None;
    }

    pub fn outcome(&self) -> Option<&CachedOutcome> {
        self.outcome.as_ref()
    }

    pub fn produced_at(&self) -> Option<DateTime<Utc>> {
        self.produced_at
    }

    /// Records a query at `now` and decides what to show.
    pub fn on_query(&mut self, now: DateTime<Utc>, run: &RunState) -> CacheDecision {
        let quiet = match self.last_query_at {
            // a clock step backwards never counts as quiet
            Some(prev) => now
                .signed_duration_since(prev)
                .to_std()
                .map(|gap| gap > self.quiet_threshold)
                .unwrap_or(false),
            None => true,
        };
        self.last_query_at = Some(now);

        if quiet && !run.phase.is_active() && self.outcome.is_some() {
            tracing::debug!(target: "speedprobe.cache", "quiet interval elapsed, dropping cached outcome");
            self.clear();
        }

        if run.phase.is_active() {
            return CacheDecision::ShowProgress(run.clone());
        }

        match &self.outcome {
            Some(CachedOutcome::Result(result)) => {
                let age = self
                    .produced_at
                    .map(|t| now.signed_duration_since(t))
                    .unwrap_or_else(chrono::Duration::zero)
                    .max(chrono::Duration::zero());
                CacheDecision::ShowResult {
                    result: result.clone(),
                    age,
                }
            }
            Some(CachedOutcome::Failure(failure)) => CacheDecision::ShowFailure(failure.clone()),
            None => CacheDecision::Idle,
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(Duration::from_millis(2_000))
    }
}
