mod classify;
pub mod exit;
mod process;
mod run;
mod state;
mod tee;
mod traits;

pub use classify::{classify_failure, resolve_outcome};
pub use process::{ExitOutcome, MeasurementProcess};
pub use run::{MeasurementRunner, RunHandle, RunnerServices, StartOutcome, ALREADY_RUNNING_MSG};
pub use state::{RunPhase, RunState, STATUS_CONNECTING, STATUS_RATE_LIMITED};
pub use traits::{RunnerPlugin, RunnerSession, RunnerStartArgs};
