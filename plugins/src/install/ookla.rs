use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use speedprobe_core::api::{BinaryProvider, InstallError, SpeedtestCliConfig};

use super::archive::{self, ArchiveKind};

/// Fetches the Ookla speedtest CLI into a per-user directory on first use.
///
/// Two processes racing on a first install may both download; each writes its own
/// archive file and the extracted binary is identical, so the last writer wins.
pub struct OoklaInstaller {
    install_dir: PathBuf,
    binary: PathBuf,
    download_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OoklaInstaller {
    pub fn new(cfg: &SpeedtestCliConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.fetch_timeout())
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            install_dir: cfg.resolved_install_dir(),
            binary: cfg.binary_path(),
            download_url: cfg.resolved_download_url(),
            timeout: cfg.fetch_timeout(),
            client,
        })
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    async fn download(&self, dest: &Path) -> Result<(), InstallError> {
        let resp = self
            .client
            .get(&self.download_url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(InstallError::HttpStatus {
                url: self.download_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| self.fetch_error(e))?;
        tracing::debug!(target: "speedprobe.install", bytes = body.len(), "archive downloaded");
        tokio::fs::write(dest, &body)
            .await
            .map_err(|source| InstallError::Io {
                path: dest.to_path_buf(),
                source,
            })
    }

    fn fetch_error(&self, err: reqwest::Error) -> InstallError {
        if err.is_timeout() {
            InstallError::Timeout {
                url: self.download_url.clone(),
                secs: self.timeout.as_secs(),
            }
        } else {
            InstallError::Fetch {
                url: self.download_url.clone(),
                source: err.into(),
            }
        }
    }
}

#[async_trait]
impl BinaryProvider for OoklaInstaller {
    async fn ensure_binary(&self) -> Result<PathBuf, InstallError> {
        let binary = self.binary_path().to_path_buf();
        if tokio::fs::try_exists(&binary).await.unwrap_or(false) {
            return Ok(binary);
        }

        tokio::fs::create_dir_all(&self.install_dir)
            .await
            .map_err(|source| InstallError::Io {
                path: self.install_dir.clone(),
                source,
            })?;

        let kind = ArchiveKind::from_url(&self.download_url);
        let archive_path = self
            .install_dir
            .join(format!("download-{}.{}", std::process::id(), kind.extension()));
        tracing::info!(
            target: "speedprobe.install",
            url = %self.download_url,
            dir = %self.install_dir.display(),
            "installing speedtest cli"
        );

        let fetched = self.download(&archive_path).await;
        let extracted = match fetched {
            Ok(()) => {
                let (archive, dest) = (archive_path.clone(), self.install_dir.clone());
                tokio::task::spawn_blocking(move || archive::extract(kind, &archive, &dest))
                    .await
                    .unwrap_or_else(|e| {
                        Err(InstallError::Extract {
                            archive: archive_path.clone(),
                            source: e.into(),
                        })
                    })
            }
            Err(e) => Err(e),
        };
        if let Err(e) = tokio::fs::remove_file(&archive_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(target: "speedprobe.install", path = %archive_path.display(), error = %e, "failed to remove downloaded archive");
            }
        }
        extracted?;

        if !tokio::fs::try_exists(&binary).await.unwrap_or(false) {
            return Err(InstallError::BinaryMissing(binary));
        }
        make_executable(&binary).await?;
        tracing::info!(target: "speedprobe.install", path = %binary.display(), "speedtest cli installed");
        Ok(binary)
    }
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|source| InstallError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<(), InstallError> {
    Ok(())
}
