//! Token Verifier Library
//!
//! Embedded in a resource server to authenticate requests that carry an
//! RS256 access token from the token issuer.
//!
//! # Flow
//!
//! ```text
//! Authorization header -> BearerAuthenticator -> JwtValidator -> JwksClient -> issuer JWKS
//! ```
//!
//! # Modules
//!
//! - `auth` - JWKS cache, signature and claim verification
//! - `config` - Verifier configuration from environment
//! - `errors` - Fetch, lookup and validation errors
//! - `middleware` - Bearer authentication entry point
//! - `observability` - Metrics

pub mod auth;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod observability;

pub use auth::{Identity, JwksClient, JwtValidator};
pub use config::VerifierConfig;
pub use errors::{JwksError, JwksFetchError, TokenValidationError};
pub use middleware::{AuthenticationFailure, BearerAuthenticator};
