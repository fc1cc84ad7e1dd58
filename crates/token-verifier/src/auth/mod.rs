//! Access token verification against the issuer's published key set.
//!
//! # Components
//!
//! - `jwks` - Cached key set client
//! - `jwt` - Signature and claim checks
//! - `claims` - Verified claims and the resulting identity

pub mod claims;
pub mod jwks;
pub mod jwt;

pub use claims::{AccessTokenClaims, Identity};
pub use jwks::JwksClient;
pub use jwt::JwtValidator;
