//! Session orchestration for ClipGenius.
//!
//! A [`Session`] owns the asset registry, starts a metadata probe for every
//! added asset, and drives the UPLOAD → PROCESSING → RESULT flow around a
//! single strategy request.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod progress;
pub mod registry;
pub mod session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use logging::SessionLogger;
pub use registry::{AssetRegistry, VideoAsset};
pub use session::{IgnoreReason, Session, SessionSnapshot, StartOutcome, FAILURE_NOTICE};
