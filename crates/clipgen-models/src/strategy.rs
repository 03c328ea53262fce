//! Content strategy models.
//!
//! [`Strategy`] is the contract the external content service must satisfy.
//! Every field is required: a payload missing any of them fails to
//! deserialize. [`ProcessingResult`] is the strategy plus the two duration
//! fields computed locally.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::asset::AssetSummary;

/// The short is one quarter of the source.
pub const TARGET_RATIO: f64 = 4.0;

/// Target duration for a source of `original` seconds.
pub fn target_duration_for(original: f64) -> f64 {
    original / TARGET_RATIO
}

/// Summarized payload sent to the strategy service.
///
/// Identity fields come from the first asset only; the duration is the sum
/// over all assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    #[validate(length(min = 1, max = 1024))]
    pub name: String,

    /// Size in bytes of the representative file
    pub size: u64,

    pub mime_type: String,

    /// Sum of all asset durations in seconds
    #[validate(range(min = 0.0))]
    pub total_duration: f64,
}

impl AggregateRequest {
    /// Build the aggregate from the current asset collection.
    ///
    /// Returns `None` for an empty collection.
    pub fn from_assets(assets: &[AssetSummary]) -> Option<Self> {
        let first = assets.first()?;
        let total_duration = assets.iter().map(|a| a.duration).sum();

        Some(Self {
            name: first.name.clone(),
            size: first.size,
            mime_type: first.mime_type.clone(),
            total_duration,
        })
    }

    pub fn target_duration(&self) -> f64 {
        target_duration_for(self.total_duration)
    }
}

/// YouTube Shorts metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YoutubeMetadata {
    pub title: String,
    pub tags: Vec<String>,
}

/// TikTok metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TiktokMetadata {
    pub caption: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlatformMetadata {
    pub youtube: YoutubeMetadata,
    pub tiktok: TiktokMetadata,
}

/// A segment the strategy claims is especially engaging.
///
/// Times are seconds from the start of the (aggregate) source. Segments are
/// not guaranteed to be ordered or non-overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightSegment {
    pub start: f64,
    pub end: f64,
    pub description: String,
}

impl HighlightSegment {
    /// Length in seconds; zero for inverted segments.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// `start` formatted as a clock string.
    pub fn start_clock(&self) -> String {
        format_clock(self.start)
    }

    /// `end` formatted as a clock string.
    pub fn end_clock(&self) -> String {
        format_clock(self.end)
    }
}

/// Strategy generated by the external service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub title: String,
    pub description: String,
    pub hashtags: Vec<String>,

    /// Expected 0-100; not clamped
    pub viral_score: f64,

    pub platforms: PlatformMetadata,
    pub highlight_segments: Vec<HighlightSegment>,
}

/// Strategy plus locally derived durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    #[serde(flatten)]
    pub strategy: Strategy,

    pub original_duration: f64,

    /// Always `original_duration / 4`
    pub target_duration: f64,
}

impl ProcessingResult {
    pub fn new(strategy: Strategy, original_duration: f64) -> Self {
        Self {
            strategy,
            original_duration,
            target_duration: target_duration_for(original_duration),
        }
    }

    /// Viral score clamped to 0-100 for display.
    pub fn display_score(&self) -> u8 {
        self.strategy.viral_score.clamp(0.0, 100.0).round() as u8
    }
}

/// Format seconds as `MM:SS`, or `H:MM:SS` past the hour.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
