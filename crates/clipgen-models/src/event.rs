//! Session event types.
//!
//! Published by the session to whoever renders it. A renderer that falls
//! behind can always recover the full state from a session snapshot.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AssetId, SessionPhase};

/// Classification of a failed strategy request.
///
/// Users see one generic notice regardless of kind; the kind is kept for
/// logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network error, timeout or non-2xx response
    Transport,
    /// Response did not satisfy the strategy schema
    Contract,
    /// Credential rejected
    Auth,
    Unknown,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Contract => "contract",
            FailureKind::Auth => "auth",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Assets were added or removed
    AssetsChanged { count: usize },

    /// A metadata probe patched an asset's duration
    AssetProbed {
        #[serde(rename = "assetId")]
        asset_id: AssetId,
        duration: f64,
    },

    PhaseChanged { phase: SessionPhase },

    /// Synthetic progress (0-100)
    Progress { value: u8 },

    /// A strategy was stored; the phase flips to RESULT shortly after
    ResultReady,

    /// Strategy request failed and the session rolled back
    Failure {
        message: String,
        kind: FailureKind,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    pub fn progress(value: u8) -> Self {
        Self::Progress { value }
    }

    pub fn phase(phase: SessionPhase) -> Self {
        Self::PhaseChanged { phase }
    }

    pub fn failure(message: impl Into<String>, kind: FailureKind) -> Self {
        Self::Failure {
            message: message.into(),
            kind,
            timestamp: Utc::now(),
        }
    }
}
