//! Token issuer library.
//!
//! Holds the RSA signing key, mints RS256 access tokens, publishes the
//! matching JWKS document and manages rotating refresh tokens.
//!
//! # Modules
//!
//! - `config` - Environment configuration
//! - `crypto` - Signing, randomness and bcrypt helpers
//! - `errors` - Error types
//! - `keys` - Signing key loading (PKCS#1, PKCS#8, encrypted variants)
//! - `models` - Principal and token response types
//! - `observability` - Tracing setup and metrics
//! - `repositories` - Refresh token storage contract
//! - `services` - Token issuer, JWKS publisher, refresh tokens, token pairs

pub mod config;
pub mod crypto;
pub mod errors;
pub mod keys;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
