//! Verifier metrics.
//!
//! Prometheus naming: `verifier_` prefix, `_total` suffix for counters.
//!
//! # Cardinality
//!
//! - `status`: 2 values (success, error)
//! - `error_category`: bounded by `TokenValidationError` variants, plus `none`

use metrics::counter;

/// Record a token verification outcome.
///
/// Metric: `verifier_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: &str) {
    counter!(
        "verifier_token_validations_total",
        "status" => status.to_string(),
        "error_category" => error_category.to_string()
    )
    .increment(1);
}

/// Record a JWKS fetch attempt.
///
/// Metric: `verifier_jwks_fetches_total`
/// Labels: `status`
pub fn record_jwks_fetch(status: &str) {
    counter!("verifier_jwks_fetches_total", "status" => status.to_string()).increment(1);
}
