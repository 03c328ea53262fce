//! Session error types.

use clipgen_models::{AssetId, SessionPhase};
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("Duplicate asset id: {0}")]
    DuplicateAsset(AssetId),

    #[error("Operation requires phase {expected}, session is in {actual}")]
    InvalidPhase {
        expected: SessionPhase,
        actual: SessionPhase,
    },

    #[error("Media error: {0}")]
    Media(#[from] clipgen_media::MediaError),
}

impl SessionError {
    pub fn invalid_phase(expected: SessionPhase, actual: SessionPhase) -> Self {
        Self::InvalidPhase { expected, actual }
    }
}
