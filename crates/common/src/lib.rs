//! Common utilities and types shared by the Warden issuer and verifier crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, key ID extraction, bearer parsing)
pub mod jwt;

/// Module for the JSON Web Key Set wire format
pub mod jwks;
