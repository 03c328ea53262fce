//! Shared data models for ClipGenius.
//!
//! This crate provides Serde-serializable types for:
//! - Video assets and their identity/status
//! - The aggregate request sent to the content strategy service
//! - The strategy contract returned by the service
//! - Session phases, processing steps and session events

pub mod asset;
pub mod event;
pub mod phase;
pub mod platform;
pub mod strategy;

// Re-export common types
pub use asset::{AssetId, AssetStatus, AssetSummary, DEFAULT_DURATION_SECS};
pub use event::{FailureKind, SessionEvent};
pub use phase::{ProcessingStep, SessionPhase};
pub use platform::{ParsePlatformError, Platform};
pub use strategy::{
    format_clock, target_duration_for, AggregateRequest, HighlightSegment, PlatformMetadata, ProcessingResult,
    Strategy, TiktokMetadata, YoutubeMetadata, TARGET_RATIO,
};
