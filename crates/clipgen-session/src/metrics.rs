//! Session metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding binary installs a recorder.

use clipgen_models::FailureKind;
use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Strategy requests by outcome (`success` / `failure`).
    pub const STRATEGY_REQUESTS_TOTAL: &str = "clipgen_strategy_requests_total";

    /// Failed strategy requests by failure kind.
    pub const STRATEGY_FAILURES_TOTAL: &str = "clipgen_strategy_failures_total";

    /// Strategy request latency in seconds.
    pub const STRATEGY_REQUEST_SECONDS: &str = "clipgen_strategy_request_seconds";

    /// Metadata probes that failed (cancellations excluded).
    pub const PROBE_FAILURES_TOTAL: &str = "clipgen_probe_failures_total";
}

/// Record a settled strategy request.
pub fn record_strategy_request(failure: Option<FailureKind>, duration_secs: f64) {
    let outcome = if failure.is_some() { "failure" } else { "success" };
    counter!(names::STRATEGY_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::STRATEGY_REQUEST_SECONDS).record(duration_secs);

    if let Some(kind) = failure {
        counter!(names::STRATEGY_FAILURES_TOTAL, "kind" => kind.as_str()).increment(1);
    }
}

pub fn record_probe_failure() {
    counter!(names::PROBE_FAILURES_TOTAL).increment(1);
}
