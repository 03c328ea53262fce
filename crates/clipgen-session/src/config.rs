//! Session configuration.

use std::time::Duration;

use clipgen_models::DEFAULT_DURATION_SECS;

/// Session timing and defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Duration assumed for an asset until its probe resolves (seconds)
    pub default_duration: f64,
    /// Interval between synthetic progress steps
    pub progress_tick: Duration,
    /// Progress shown as soon as processing starts
    pub progress_start: u8,
    /// Increment per tick
    pub progress_step: u8,
    /// Synthetic progress never passes this value
    pub progress_cap: u8,
    /// Delay between reaching 100% and switching to the result view
    pub completion_delay: Duration,
    /// Upper bound for a single metadata probe
    pub probe_timeout: Duration,
    /// Buffered events per subscriber
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION_SECS,
            progress_tick: Duration::from_millis(800),
            progress_start: 10,
            progress_step: 5,
            progress_cap: 90,
            completion_delay: Duration::from_millis(500),
            probe_timeout: Duration::from_secs(30),
            event_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_duration: env_parse("CLIPGEN_DEFAULT_DURATION_SECS")
                .filter(|d: &f64| d.is_finite() && *d >= 0.0)
                .unwrap_or(defaults.default_duration),
            progress_tick: Duration::from_millis(
                env_parse("CLIPGEN_PROGRESS_TICK_MS")
                    .filter(|ms: &u64| *ms > 0)
                    .unwrap_or(800),
            ),
            progress_start: env_parse("CLIPGEN_PROGRESS_START").unwrap_or(defaults.progress_start),
            progress_step: env_parse("CLIPGEN_PROGRESS_STEP").unwrap_or(defaults.progress_step),
            progress_cap: env_parse("CLIPGEN_PROGRESS_CAP")
                .map(|cap: u8| cap.min(99))
                .unwrap_or(defaults.progress_cap),
            completion_delay: Duration::from_millis(
                env_parse("CLIPGEN_COMPLETION_DELAY_MS").unwrap_or(500),
            ),
            probe_timeout: Duration::from_secs(
                env_parse("CLIPGEN_PROBE_TIMEOUT_SECS").unwrap_or(30),
            ),
            event_capacity: env_parse("CLIPGEN_EVENT_CAPACITY")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.event_capacity),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
