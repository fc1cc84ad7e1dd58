//! Cryptographic primitives for the issuer: RS256 signing, refresh token
//! randomness and bcrypt hashing.
//!
//! Signing-key parsing lives in [`crate::keys`]; everything here takes an
//! already-loaded key.

use crate::errors::{RefreshTokenError, SigningError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::jwt::JWT_TYPE;
use common::secret::SecretString;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Number of random bytes behind each refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Access token claims.
///
/// `roles` carries a single upper-cased role name. Verifiers prefix it with
/// `ROLE_` to form the authority.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub username: String,
    pub roles: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("sub", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("iss", &self.iss)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Sign claims as a compact RS256 JWS with `kid` and `typ` headers.
#[instrument(skip_all)]
pub fn sign_jwt(
    claims: &AccessClaims,
    encoding_key: &EncodingKey,
    key_id: &str,
) -> Result<String, SigningError> {
    if claims.exp <= claims.iat {
        return Err(SigningError::Claims(
            "expiry must be after issue time".to_string(),
        ));
    }

    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some(JWT_TYPE.to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, claims, encoding_key).map_err(|e| SigningError::Jwt(e.to_string()))
}

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>, RefreshTokenError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| RefreshTokenError::Random)?;
    Ok(bytes)
}

/// Generate a raw refresh token (32 random bytes, base64url without padding).
#[instrument(skip_all)]
pub fn generate_refresh_token() -> Result<SecretString, RefreshTokenError> {
    let bytes = generate_random_bytes(REFRESH_TOKEN_BYTES)?;
    Ok(SecretString::from(URL_SAFE_NO_PAD.encode(bytes)))
}

/// Hash a raw refresh token with bcrypt.
#[instrument(skip_all)]
pub fn hash_refresh_token(raw: &str, cost: u32) -> Result<String, RefreshTokenError> {
    bcrypt::hash(raw, cost).map_err(|e| RefreshTokenError::Hashing(e.to_string()))
}

/// Check a raw refresh token against its stored bcrypt hash.
#[instrument(skip_all)]
pub fn verify_refresh_token(raw: &str, hash: &str) -> Result<bool, RefreshTokenError> {
    bcrypt::verify(raw, hash).map_err(|e| RefreshTokenError::Hashing(e.to_string()))
}
