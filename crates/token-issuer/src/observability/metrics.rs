//! Issuer metrics.
//!
//! Prometheus naming: `issuer_` prefix, `_total` suffix for counters.
//!
//! # Cardinality
//!
//! - `status`: 2 values (success, error)
//! - `operation`: 5 values (generate, validate, rotate, revoke_all, expire)
//! - refresh `status`: success, rejected, error

use metrics::counter;

/// Record an access token signing attempt.
///
/// Metric: `issuer_access_tokens_issued_total`
/// Labels: `status`
pub fn record_access_token_issued(status: &str) {
    counter!("issuer_access_tokens_issued_total", "status" => status.to_string()).increment(1);
}

/// Record a refresh token lifecycle operation.
///
/// Metric: `issuer_refresh_token_operations_total`
/// Labels: `operation`, `status`
pub fn record_refresh_token_operation(operation: &str, status: &str) {
    counter!(
        "issuer_refresh_token_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
