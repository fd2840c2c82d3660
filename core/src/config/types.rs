use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cli: SpeedtestCliConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedtestCliConfig {
    #[serde(default = "default_cli_version")]
    pub version: String,

    /// Overrides the platform release archive URL.
    #[serde(default)]
    pub download_url: Option<String>,

    /// Directory holding the extracted binary. Defaults under the user data dir.
    #[serde(default)]
    pub install_dir: Option<String>,

    #[serde(default = "default_cli_args")]
    pub args: Vec<String>,

    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_cli_version() -> String {
    "1.2.0".to_string()
}

fn default_cli_args() -> Vec<String> {
    [
        "--format=json",
        "--progress=yes",
        "--accept-license",
        "--accept-gdpr",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

impl Default for SpeedtestCliConfig {
    fn default() -> Self {
        Self {
            version: default_cli_version(),
            download_url: None,
            install_dir: None,
            args: default_cli_args(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl SpeedtestCliConfig {
    pub fn binary_name(&self) -> &'static str {
        if cfg!(windows) {
            "speedtest.exe"
        } else {
            "speedtest"
        }
    }

    pub fn resolved_install_dir(&self) -> PathBuf {
        match self.install_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("speedprobe")
                .join("cli"),
        }
    }

    pub fn binary_path(&self) -> PathBuf {
        self.resolved_install_dir().join(self.binary_name())
    }

    pub fn resolved_download_url(&self) -> String {
        match self.download_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!(
                "https://install.speedtest.net/app/cli/ookla-speedtest-{}-{}",
                self.version,
                platform_archive_suffix()
            ),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

fn platform_archive_suffix() -> &'static str {
    if cfg!(windows) {
        "win64.zip"
    } else if cfg!(target_os = "macos") {
        "macosx-universal.tgz"
    } else if cfg!(target_arch = "aarch64") {
        "linux-aarch64.tgz"
    } else {
        "linux-x86_64.tgz"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub interval_ms: u64,

    /// Pause between run teardown and the final forced re-query.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_refresh_interval_ms() -> u64 {
    300
}

fn default_settle_delay_ms() -> u64 {
    50
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_refresh_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_quiet_threshold_ms")]
    pub quiet_threshold_ms: u64,
}

fn default_quiet_threshold_ms() -> u64 {
    2_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quiet_threshold_ms: default_quiet_threshold_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum RunnerConfig {
    #[default]
    #[serde(rename = "speedtest")]
    Speedtest,
    #[serde(rename = "replay")]
    Replay(ReplayRunnerConfig),
}

/// Replays a recorded run instead of spawning the real tool.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReplayRunnerConfig {
    pub events_file: String,
    #[serde(default)]
    pub stderr_file: Option<String>,
    #[serde(default)]
    pub exit_code: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// When set, logs go to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_action_keyword")]
    pub action_keyword: String,

    #[serde(default)]
    pub dark_theme: bool,
}

fn default_action_keyword() -> String {
    "st".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            action_keyword: default_action_keyword(),
            dark_theme: false,
        }
    }
}
