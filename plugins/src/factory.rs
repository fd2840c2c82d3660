use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use speedprobe_core::api::{
    AppConfig, BinaryProvider, HostBridge, PresetBinary, RunnerConfig, RunnerPlugin,
    RunnerServices,
};

use crate::install::OoklaInstaller;
use crate::runner::{ReplayRunnerPlugin, SpeedtestRunnerPlugin};

pub fn build_runner(cfg: &AppConfig) -> Arc<dyn RunnerPlugin> {
    match &cfg.runner {
        RunnerConfig::Speedtest => Arc::new(SpeedtestRunnerPlugin::new()),
        RunnerConfig::Replay(r_cfg) => Arc::new(ReplayRunnerPlugin::new(r_cfg)),
    }
}

/// Replayed runs never touch the network, so they get a placeholder binary.
pub fn build_installer(cfg: &AppConfig) -> Result<Arc<dyn BinaryProvider>> {
    match &cfg.runner {
        RunnerConfig::Speedtest => Ok(Arc::new(OoklaInstaller::new(&cfg.cli)?)),
        RunnerConfig::Replay(r_cfg) => Ok(Arc::new(PresetBinary(PathBuf::from(
            &r_cfg.events_file,
        )))),
    }
}

pub fn build_services(cfg: &AppConfig, host: Arc<dyn HostBridge>) -> Result<RunnerServices> {
    Ok(RunnerServices {
        installer: build_installer(cfg)?,
        runner: build_runner(cfg),
        host,
    })
}
