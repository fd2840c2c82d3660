use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;

use speedprobe_core::api::InstallError;

/// Packaging of a speedtest CLI release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Windows releases are zips, everything else ships as a gzipped tarball.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.to_ascii_lowercase().ends_with(".zip") {
            ArchiveKind::Zip
        } else {
            ArchiveKind::TarGz
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGz => "tgz",
        }
    }
}

/// Unpacks `archive` into `dest`. Blocking; run it off the async executor.
pub fn extract(kind: ArchiveKind, archive: &Path, dest: &Path) -> Result<(), InstallError> {
    let file = File::open(archive).map_err(|source| InstallError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let extract_err = |source: anyhow::Error| InstallError::Extract {
        archive: archive.to_path_buf(),
        source,
    };

    match kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| extract_err(e.into()))?;
            zip.extract(dest).map_err(|e| extract_err(e.into()))
        }
        ArchiveKind::TarGz => {
            let mut tar = tar::Archive::new(GzDecoder::new(file));
            tar.unpack(dest).map_err(|e| extract_err(e.into()))
        }
    }
}
