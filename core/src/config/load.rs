use std::path::Path;

use super::types::AppConfig;

pub fn load_default() -> anyhow::Result<AppConfig> {
    let path = std::env::var("SPEEDPROBE_CONFIG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "config.toml".to_string());
    load_from_path(Path::new(&path))
}

/// Reads `path` if it exists (defaults otherwise), then applies env overrides.
pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let mut cfg: AppConfig = if path.exists() {
        let s = std::fs::read_to_string(path)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Some(v) = non_blank_env("SPEEDPROBE_INSTALL_DIR") {
        cfg.cli.install_dir = Some(v);
    }
    if let Some(v) = non_blank_env("SPEEDPROBE_DOWNLOAD_URL") {
        cfg.cli.download_url = Some(v);
    }
    if let Some(v) = non_blank_env("SPEEDPROBE_LOG_LEVEL") {
        cfg.logging.level = v;
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
