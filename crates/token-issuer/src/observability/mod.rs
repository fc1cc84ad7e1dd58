//! Observability for the issuer.
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit field
//! allow-listing. Fields fall into two groups:
//! - **SAFE**: key IDs, encodings, lifetimes, operation and status labels
//! - **NEVER**: raw refresh tokens, bcrypt hashes, passphrases, key material,
//!   subjects and usernames

pub mod metrics;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` drives the filter (falling back to `default_filter`);
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
