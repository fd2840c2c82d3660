use serde::Deserialize;

use crate::measurement::{bytes_to_mbps, MeasurementResult};

/// Wire shape of one `speedtest --format=json --progress=yes` output line.
///
/// Every field is optional; absent values fall back to zero or empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpeedtestRecord {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub server: Option<ServerInfo>,
    pub ping: Option<PingInfo>,
    pub download: Option<TransferInfo>,
    pub upload: Option<TransferInfo>,
    pub result: Option<ResultInfo>,
    pub isp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PingInfo {
    pub latency: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransferInfo {
    pub bandwidth: f64,
    pub progress: f64,
    pub latency: Option<LatencyInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LatencyInfo {
    pub jitter: f64,
    pub iqm: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResultInfo {
    pub url: Option<String>,
}

impl TransferInfo {
    fn jitter(&self) -> f64 {
        self.latency.as_ref().map(|l| l.jitter).unwrap_or(0.0)
    }

    fn iqm(&self) -> f64 {
        self.latency.as_ref().map(|l| l.iqm).unwrap_or(0.0)
    }
}

impl SpeedtestRecord {
    pub fn server_name(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.name.clone())
            .unwrap_or_default()
    }

    /// (progress fraction, bandwidth bytes/s) of a download or upload sample.
    pub fn download_sample(&self) -> (f64, f64) {
        sample(self.download.as_ref())
    }

    pub fn upload_sample(&self) -> (f64, f64) {
        sample(self.upload.as_ref())
    }

    pub fn to_result(&self) -> MeasurementResult {
        let download = self.download.clone().unwrap_or_default();
        let upload = self.upload.clone().unwrap_or_default();
        MeasurementResult {
            download_mbps: bytes_to_mbps(download.bandwidth),
            upload_mbps: bytes_to_mbps(upload.bandwidth),
            ping_ms: self.ping.as_ref().map(|p| p.latency).unwrap_or(0.0),
            download_jitter_ms: download.jitter(),
            download_latency_ms: download.iqm(),
            upload_jitter_ms: upload.jitter(),
            upload_latency_ms: upload.iqm(),
            server_name: self.server_name(),
            server_location: self
                .server
                .as_ref()
                .and_then(|s| s.location.clone())
                .unwrap_or_default(),
            isp: self.isp.clone().unwrap_or_default(),
            result_url: self
                .result
                .as_ref()
                .and_then(|r| r.url.clone())
                .filter(|u| !u.trim().is_empty()),
        }
    }
}

fn sample(info: Option<&TransferInfo>) -> (f64, f64) {
    info.map(|t| (t.progress, t.bandwidth)).unwrap_or((0.0, 0.0))
}
