//! Owned file handles and their revocable previews.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Exclusive handle on a selected video file.
///
/// Dropping the handle revokes every preview created from it.
#[derive(Debug)]
pub struct MediaHandle {
    path: Arc<PathBuf>,
    name: String,
    size: u64,
    mime_type: String,
    revoked: Arc<AtomicBool>,
}

impl MediaHandle {
    /// Open a video file.
    ///
    /// The MIME type is guessed from the extension and must be `video/*`.
    pub async fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();

        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        if !meta.is_file() {
            return Err(MediaError::InvalidVideo(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let mime = mime_guess::from_path(path).first().ok_or_else(|| {
            MediaError::UnsupportedFormat(format!("cannot determine type of {}", path.display()))
        })?;
        if mime.type_() != mime_guess::mime::VIDEO {
            return Err(MediaError::UnsupportedFormat(format!(
                "{} is {}, not a video",
                path.display(),
                mime
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: Arc::new(path.to_path_buf()),
            name,
            size: meta.len(),
            mime_type: mime.essence_str().to_string(),
            revoked: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Create a preview handle tied to this handle's lifetime.
    pub fn preview(&self) -> PreviewHandle {
        PreviewHandle {
            path: Arc::clone(&self.path),
            revoked: Arc::clone(&self.revoked),
        }
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        self.revoked.store(true, Ordering::Release);
        debug!("Released media handle for {}", self.path.display());
    }
}

/// Revocable reference to a [`MediaHandle`]'s file.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    path: Arc<PathBuf>,
    revoked: Arc<AtomicBool>,
}

impl PreviewHandle {
    /// Path of the previewed file, unless the owner has been released.
    pub fn path(&self) -> MediaResult<&Path> {
        if self.is_revoked() {
            return Err(MediaError::Revoked);
        }
        Ok(&self.path)
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }
}
