//! Media errors.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("ffprobe is not installed or not on PATH")]
    FfprobeNotFound,

    #[error("ffprobe rejected {}: {stderr}", .path.display())]
    ProbeFailed { path: PathBuf, stderr: String },

    #[error("No such file: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The owning handle was dropped while a reader still held the preview.
    #[error("Preview revoked: the asset was released")]
    Revoked,

    #[error("Probe gave up after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable ffprobe output: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Not a usable video: {0}")]
    InvalidVideo(String),

    #[error("Not a video type: {0}")]
    UnsupportedFormat(String),
}

impl MediaError {
    pub fn probe_failed(path: &Path, stderr: &[u8]) -> Self {
        Self::ProbeFailed {
            path: path.to_path_buf(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Cancellation, as opposed to a failed probe.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediaError::Revoked)
    }
}
