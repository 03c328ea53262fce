//! Strategy client error types.

use clipgen_models::FailureKind;
use thiserror::Error;

pub type StrategyResult<T> = Result<T, StrategyError>;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid strategy request: {0}")]
    InvalidRequest(String),

    #[error("Gemini API request failed: {0}")]
    Transport(String),

    #[error("Gemini API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Gemini rejected the credential ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Strategy response violated the contract: {0}")]
    Contract(String),
}

impl StrategyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    /// Classify a non-2xx response.
    ///
    /// Gemini answers an invalid key with 400 `API_KEY_INVALID`, so the body
    /// is inspected as well as the status.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let mentions_key = body.contains("API_KEY_INVALID") || body.contains("API key not valid");

        match status {
            401 | 403 => Self::Auth { status, body },
            400 if mentions_key => Self::Auth { status, body },
            _ => Self::Http { status, body },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            StrategyError::Transport(_) | StrategyError::Http { .. } => FailureKind::Transport,
            StrategyError::Auth { .. } | StrategyError::Config(_) => FailureKind::Auth,
            StrategyError::Contract(_) => FailureKind::Contract,
            StrategyError::InvalidRequest(_) => FailureKind::Unknown,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            StrategyError::Http { status, .. } | StrategyError::Auth { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StrategyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("request timed out: {}", e))
        } else if e.is_decode() {
            Self::Contract(format!("undecodable response body: {}", e))
        } else {
            Self::Transport(e.to_string())
        }
    }
}
