use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::cache::{CacheDecision, CachedOutcome, ResultCache};
use crate::config::{AppConfig, RefreshConfig, SpeedtestCliConfig};
use crate::host::HostBridge;
use crate::install::BinaryProvider;
use crate::measurement::{Failure, FailureReason, MeasurementResult};
use crate::progress::ProgressEvent;
use crate::refresh::RefreshPump;

use super::classify::{classify_failure, resolve_outcome};
use super::process::MeasurementProcess;
use super::state::{RunPhase, RunState};
use super::traits::{RunnerPlugin, RunnerStartArgs};

pub const ALREADY_RUNNING_MSG: &str = "Speed test is already running";

/// Collaborators a runner needs to do its job.
#[derive(Clone)]
pub struct RunnerServices {
    pub installer: Arc<dyn BinaryProvider>,
    pub runner: Arc<dyn RunnerPlugin>,
    pub host: Arc<dyn HostBridge>,
}

pub enum StartOutcome {
    Started(RunHandle),
    AlreadyRunning,
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started(_))
    }
}

/// Handle to the background worker of one run.
pub struct RunHandle {
    run_id: String,
    handle: JoinHandle<RunPhase>,
}

impl RunHandle {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Waits for the run, including its teardown, and returns the terminal phase.
    pub async fn join(self) -> RunPhase {
        self.handle.await.unwrap_or(RunPhase::Failed)
    }
}

struct Shared {
    run: RunState,
    cache: ResultCache,
}

struct Inner {
    shared: Mutex<Shared>,
    services: RunnerServices,
    cli: SpeedtestCliConfig,
    refresh: RefreshConfig,
    runtime: Handle,
}

/// Single-flight measurement state machine.
///
/// Cheap to clone; all clones share one [`RunState`] and one [`ResultCache`].
/// The run worker is the only writer of progress fields, the query path only
/// reads them (and may clear the cache).
#[derive(Clone)]
pub struct MeasurementRunner {
    inner: Arc<Inner>,
}

impl MeasurementRunner {
    /// Must be called from within a Tokio runtime; runs are spawned onto it.
    pub fn new(cfg: &AppConfig, services: RunnerServices) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    run: RunState::default(),
                    cache: ResultCache::new(Duration::from_millis(cfg.cache.quiet_threshold_ms)),
                }),
                services,
                cli: cfg.cli.clone(),
                refresh: cfg.refresh.clone(),
                runtime: Handle::current(),
            }),
        }
    }

    /// Starts a run unless one is already active.
    ///
    /// Never blocks: the measurement itself runs on a background task.
    pub fn request_start(&self) -> StartOutcome {
        let run_id = Uuid::new_v4().to_string();
        let began = self.inner.lock().run.begin(run_id.clone());
        if !began {
            tracing::info!(target: "speedprobe.runner", "start rejected, a run is already active");
            self.inner.services.host.show_msg(ALREADY_RUNNING_MSG);
            return StartOutcome::AlreadyRunning;
        }

        tracing::info!(target: "speedprobe.runner", run_id = %run_id, "measurement started");
        let inner = self.inner.clone();
        let id = run_id.clone();
        let handle = self.inner.runtime.spawn(async move { inner.drive(id).await });
        StartOutcome::Started(RunHandle { run_id, handle })
    }

    /// Records a host query at `now` and returns what to show for it.
    pub fn on_query(&self, now: DateTime<Utc>) -> CacheDecision {
        let mut guard = self.inner.lock();
        let Shared { run, cache } = &mut *guard;
        cache.on_query(now, run)
    }

    pub fn clear_cache(&self) {
        self.inner.lock().cache.clear();
    }

    pub fn snapshot(&self) -> RunState {
        self.inner.lock().run.clone()
    }

    pub fn cached_outcome(&self) -> Option<CachedOutcome> {
        self.inner.lock().cache.outcome().cloned()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().run.phase.is_active()
    }

    pub fn host(&self) -> &Arc<dyn HostBridge> {
        &self.inner.services.host
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn drive(self: Arc<Self>, run_id: String) -> RunPhase {
        let host = self.services.host.clone();
        let pump = RefreshPump::start(host.clone(), Duration::from_millis(self.refresh.interval_ms));

        let outcome = self.execute(&run_id).await;
        let phase = self.finish(&run_id, outcome);

        pump.stop();
        tokio::time::sleep(Duration::from_millis(self.refresh.settle_delay_ms)).await;
        host.change_query(&host.action_keyword(), true);
        phase
    }

    async fn execute(&self, run_id: &str) -> Result<MeasurementResult, Failure> {
        let binary = self.services.installer.ensure_binary().await.map_err(|e| {
            tracing::error!(target: "speedprobe.runner", run_id, error = %e, "speedtest binary unavailable");
            Failure::new(FailureReason::BinaryUnavailable, error_chain(&e))
        })?;

        let args = RunnerStartArgs {
            cmd: binary.to_string_lossy().into_owned(),
            args: self.cli.args.clone(),
            envs: HashMap::new(),
        };
        tracing::debug!(
            target: "speedprobe.runner",
            run_id,
            runner = self.services.runner.name(),
            cmd = %args.cmd,
            args = ?args.args,
            "starting measurement process"
        );

        let session = self
            .services
            .runner
            .start_session(&args)
            .await
            .map_err(|e| start_failure(run_id, format!("{e:#}")))?;
        let mut process =
            MeasurementProcess::start(session).map_err(|e| start_failure(run_id, error_chain(&e)))?;

        let mut final_result = None;
        let mut rate_limited = false;
        while let Some(ev) = process.next_event().await {
            match ev {
                ProgressEvent::FinalResult(result) => final_result = Some(*result),
                ev => {
                    if ev == ProgressEvent::RateLimited {
                        rate_limited = true;
                    }
                    self.lock().run.apply(&ev);
                }
            }
        }

        let exit = process.await_completion().await.map_err(|e| {
            Failure::new(FailureReason::GenericFailure, error_chain(&e))
        })?;
        tracing::info!(
            target: "speedprobe.runner",
            run_id,
            exit_code = exit.exit_code,
            saw_result = final_result.is_some(),
            "measurement process exited"
        );
        resolve_outcome(final_result, rate_limited, &exit)
    }

    fn finish(&self, run_id: &str, outcome: Result<MeasurementResult, Failure>) -> RunPhase {
        let now = Utc::now();
        let mut shared = self.lock();
        match outcome {
            Ok(result) => {
                tracing::info!(
                    target: "speedprobe.runner",
                    run_id,
                    download_mbps = result.download_mbps,
                    upload_mbps = result.upload_mbps,
                    ping_ms = result.ping_ms,
                    "measurement completed"
                );
                shared.run.finish(true, now);
                shared.cache.store_result(result, now);
                RunPhase::Completed
            }
            Err(failure) => {
                tracing::warn!(
                    target: "speedprobe.runner",
                    run_id,
                    reason = ?failure.reason,
                    diagnostic = %failure.diagnostic.trim(),
                    "measurement failed"
                );
                shared.run.finish(false, now);
                shared.cache.store_failure(failure, now);
                RunPhase::Failed
            }
        }
    }
}

fn start_failure(run_id: &str, diagnostic: String) -> Failure {
    tracing::error!(target: "speedprobe.runner", run_id, error = %diagnostic, "failed to start measurement process");
    Failure::new(classify_failure(&diagnostic, false), diagnostic)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
