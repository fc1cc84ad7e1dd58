//! Observability for the token verifier.
//!
//! The verifier is a library, so tracing subscriber setup belongs to the
//! embedding server. This module only defines metrics.

pub mod metrics;
