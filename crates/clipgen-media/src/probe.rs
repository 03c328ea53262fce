//! FFprobe duration probing.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::handle::PreviewHandle;

/// Resolves the true duration of a previewed file.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe_duration(&self, preview: &PreviewHandle) -> MediaResult<f64>;
}

/// [`DurationProbe`] backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    timeout: Duration,
}

impl FfprobeDurationProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe_duration(&self, preview: &PreviewHandle) -> MediaResult<f64> {
        let path = preview.path()?.to_path_buf();
        match tokio::time::timeout(self.timeout, get_duration(&path)).await {
            Ok(result) => result,
            Err(_) => Err(MediaError::Timeout(self.timeout.as_secs())),
        }
    }
}

/// FFprobe JSON output format (only the container section is requested).
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Get a file's duration in seconds from its container metadata.
pub async fn get_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::probe_failed(path, &output.stderr));
    }

    let duration = parse_duration(&output.stdout)?;
    debug!("Probed {}: {:.2}s", path.display(), duration);
    Ok(duration)
}

/// Parse `format.duration` out of ffprobe's JSON output.
fn parse_duration(stdout: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| MediaError::InvalidVideo("No duration in container metadata".to_string()))
}
