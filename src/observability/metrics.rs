//! Request metrics.
//!
//! # Metrics
//! - `pagegate_requests_total` (counter): completed requests by method and
//!   terminal outcome
//! - `pagegate_request_duration_seconds` (histogram): latency distribution
//!   by method

use std::time::Instant;

/// Record one completed request. Called exactly once per pipeline
/// invocation, after dispatch.
pub fn record_request(method: &str, outcome: &str, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(
        "pagegate_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
    metrics::histogram!(
        "pagegate_request_duration_seconds",
        "method" => method.to_string(),
    )
    .record(elapsed);
}
