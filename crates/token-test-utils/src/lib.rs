//! # Token Test Utilities
//!
//! Shared test utilities for the token issuer and verifier crates.
//!
//! This crate provides:
//! - Deterministic RSA fixtures (one key in every supported PEM encoding)
//! - Test data builders (`TestTokenBuilder` signs arbitrary RS256 claims)
//! - A wiremock-backed JWKS endpoint (`JwksMock`)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use token_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let jwks = JwksMock::start(reference_jwks("k1")).await;
//!
//!     let token = TestTokenBuilder::new()
//!         .for_subject("42")
//!         .with_role("USER")
//!         .sign();
//!
//!     token.assert_valid_jwt().assert_signed_by("k1");
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod jwks_mock;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use jwks_mock::*;
pub use token_builders::*;
