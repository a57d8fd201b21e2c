//! Metrics collection.
//!
//! # Metrics
//! - `pocket_rpc_requests_total` (counter): provider calls by operation, outcome
//! - `pocket_rpc_request_duration_seconds` (histogram): provider call latency
//! - `pocket_relay_attempts_total` (counter): relay attempts by chain, outcome
//! - `pocket_transactions_total` (counter): submitted transactions by outcome

use std::time::Duration;

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Record a provider HTTP call.
pub fn record_rpc_call(operation: &'static str, success: bool, elapsed: Duration) {
    metrics::counter!(
        "pocket_rpc_requests_total",
        "operation" => operation,
        "outcome" => outcome(success)
    )
    .increment(1);
    metrics::histogram!("pocket_rpc_request_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}

/// Record one relay attempt; `outcome` is `success`, `retry` or `failure`.
pub fn record_relay_attempt(chain: &str, outcome: &'static str) {
    metrics::counter!(
        "pocket_relay_attempts_total",
        "chain" => chain.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a transaction submission.
pub fn record_transaction(success: bool) {
    metrics::counter!("pocket_transactions_total", "outcome" => outcome(success)).increment(1);
}
