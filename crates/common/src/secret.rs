//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use them for every
//! value that must never reach a log line: key passphrases, inline signing-key
//! content and raw refresh tokens.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that derives
//! `Debug` while holding one is safe to log via `{:?}` or tracing. Secrets are
//! zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct IssuedRefreshToken {
//!     raw_token: SecretString,
//! }
//!
//! let issued = IssuedRefreshToken {
//!     raw_token: SecretString::from("c2VjcmV0"),
//! };
//!
//! // Redacted
//! println!("{:?}", issued);
//!
//! // Explicit access only
//! let raw: &str = issued.raw_token.expose_secret();
//! assert_eq!(raw, "c2VjcmV0");
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - Signing key passphrases
//! - Inline PEM key content
//! - Raw refresh tokens handed back to callers
//!
//! With the `serde` feature enabled, secrets can be deserialized directly from
//! configuration documents.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
