//! File handles and metadata probing for selected videos.
//!
//! An asset owns a [`MediaHandle`]; the probe reads through a
//! [`PreviewHandle`] that is revoked as soon as the owning handle is dropped.

pub mod error;
pub mod handle;
pub mod probe;

pub use error::{MediaError, MediaResult};
pub use handle::{MediaHandle, PreviewHandle};
pub use probe::{get_duration, DurationProbe, FfprobeDurationProbe};
