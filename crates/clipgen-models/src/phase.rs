//! Session phases and the processing milestones shown while waiting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    /// Collecting assets
    #[default]
    Upload,
    /// Waiting for the strategy service
    Processing,
    /// Showing the strategy
    Result,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Upload => "UPLOAD",
            SessionPhase::Processing => "PROCESSING",
            SessionPhase::Result => "RESULT",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Milestones displayed on the progress view.
///
/// These are cosmetic: the strategy request is a single call and reports no
/// partial progress, so a step counts as reached once the synthetic
/// progress passes its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    ExtractHighlights,
    OptimizeAudioAndCaptions,
    GenerateMetadata,
}

impl ProcessingStep {
    pub const ALL: [ProcessingStep; 3] = [
        ProcessingStep::ExtractHighlights,
        ProcessingStep::OptimizeAudioAndCaptions,
        ProcessingStep::GenerateMetadata,
    ];

    /// Progress value the step must exceed to be shown as reached.
    pub fn threshold(&self) -> u8 {
        match self {
            ProcessingStep::ExtractHighlights => 10,
            ProcessingStep::OptimizeAudioAndCaptions => 40,
            ProcessingStep::GenerateMetadata => 70,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessingStep::ExtractHighlights => "Extracting highlight scenes",
            ProcessingStep::OptimizeAudioAndCaptions => "Optimizing audio and captions",
            ProcessingStep::GenerateMetadata => "Generating metadata (YouTube / TikTok)",
        }
    }

    pub fn is_reached(&self, progress: u8) -> bool {
        progress > self.threshold()
    }
}
