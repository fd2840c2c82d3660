//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `speedprobe_core::api` instead of reaching into internal modules.

pub use crate::cache::{CacheDecision, CachedOutcome, ResultCache};
pub use crate::config::{
    load_default, load_from_path, AppConfig, HostConfig, LoggingConfig, ReplayRunnerConfig,
    RunnerConfig, SpeedtestCliConfig,
};
pub use crate::error::{CliError, InstallError, ParseError, RunnerError};
pub use crate::host::HostBridge;
pub use crate::install::{BinaryProvider, PresetBinary};
pub use crate::measurement::{bytes_to_mbps, Failure, FailureReason, MeasurementResult};
pub use crate::plugin::SpeedTestPlugin;
pub use crate::presenter::{present, DisplayRow, RowAction};
pub use crate::progress::{ProgressEvent, ProgressEventParser};
pub use crate::refresh::RefreshPump;
pub use crate::runner::{
    exit::normalize_exit, ExitOutcome, MeasurementProcess, MeasurementRunner, RunHandle, RunPhase,
    RunState, RunnerPlugin, RunnerServices, RunnerSession, RunnerStartArgs, StartOutcome,
};
