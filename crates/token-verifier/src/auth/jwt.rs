//! Access token verification.
//!
//! Validates incoming JWTs using public keys fetched from the issuer's JWKS
//! endpoint.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only RS256 is accepted; an HS256 token signed with any secret is rejected
//! - Issuer and expiry are checked after the signature, with zero leeway
//! - Every rejection carries the same generic message

use crate::auth::claims::{AccessTokenClaims, Identity};
use crate::auth::jwks::JwksClient;
use crate::errors::{JwksError, TokenValidationError};
use crate::observability::metrics::record_token_validation;
use common::jwks::{Jwk, KEY_TYPE_RSA, KEY_USE_SIGNATURE};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::jwt::{extract_kid, split_compact, JwtValidationError, JWT_ALGORITHM};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// JWT validator using JWKS from the issuer.
pub struct JwtValidator {
    /// JWKS client for fetching public keys.
    jwks_client: Arc<JwksClient>,

    /// Exact `iss` value accepted.
    expected_issuer: String,
}

impl JwtValidator {
    /// Create a new JWT validator.
    ///
    /// # Arguments
    ///
    /// * `jwks_client` - Client for fetching public keys
    /// * `expected_issuer` - The only accepted `iss` value
    pub fn new(jwks_client: Arc<JwksClient>, expected_issuer: String) -> Self {
        Self {
            jwks_client,
            expected_issuer,
        }
    }

    /// Verify a compact JWT and return the identity it carries.
    ///
    /// # Security Checks
    ///
    /// 1. Size and structure check, then `kid` extraction from the header
    /// 2. Public key lookup through the JWKS cache
    /// 3. RS256 signature verification
    /// 4. Exact issuer match
    /// 5. Expiry (`exp <= now` is expired)
    ///
    /// # Errors
    ///
    /// Returns a `TokenValidationError` naming the failed check. All variants
    /// display the same generic message.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<Identity, TokenValidationError> {
        let result = self.verify_inner(token).await;
        match &result {
            Ok(_) => {
                record_token_validation("success", "none");
                tracing::debug!(target: "verifier.jwt", "Token validated successfully");
            }
            Err(e) => {
                record_token_validation("error", e.category());
                tracing::debug!(
                    target: "verifier.jwt",
                    error_category = e.category(),
                    "Token rejected"
                );
            }
        }
        result
    }

    async fn verify_inner(&self, token: &str) -> Result<Identity, TokenValidationError> {
        let kid = extract_kid(token).map_err(|e| match e {
            JwtValidationError::MissingKid => TokenValidationError::UnknownKeyId,
            JwtValidationError::TokenTooLarge | JwtValidationError::MalformedToken => {
                TokenValidationError::Malformed
            }
        })?;

        let jwk = self
            .jwks_client
            .get_public_key(&kid)
            .await
            .map_err(|e| match e {
                JwksError::NotFound => TokenValidationError::UnknownKeyId,
                JwksError::Fetch(fetch) => {
                    tracing::warn!(target: "verifier.jwt", error = %fetch, "Key set unavailable");
                    TokenValidationError::KeySetUnavailable
                }
            })?;

        let claims = verify_signature(token, &jwk)?;

        if claims.iss.as_deref() != Some(self.expected_issuer.as_str()) {
            return Err(TokenValidationError::IssuerMismatch);
        }

        if claims.exp <= chrono::Utc::now().timestamp() {
            return Err(TokenValidationError::Expired);
        }

        Ok(Identity::from(claims))
    }
}

/// Build a decoding key from an RSA signing JWK.
///
/// A JWK of another type, algorithm or use, or one missing its modulus or
/// exponent, cannot verify our tokens.
fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, TokenValidationError> {
    let usable = jwk.kty == KEY_TYPE_RSA
        && !matches!(jwk.alg.as_deref(), Some(alg) if alg != JWT_ALGORITHM)
        && !matches!(jwk.key_use.as_deref(), Some(key_use) if key_use != KEY_USE_SIGNATURE);
    if !usable {
        tracing::warn!(
            target: "verifier.jwt",
            kid = %jwk.kid,
            kty = %jwk.kty,
            "JWK is not an RSA signing key"
        );
        return Err(TokenValidationError::UnknownKeyId);
    }

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        tracing::warn!(target: "verifier.jwt", kid = %jwk.kid, "JWK missing n or e");
        return Err(TokenValidationError::UnknownKeyId);
    };

    DecodingKey::from_rsa_components(n, e).map_err(|err| {
        tracing::warn!(target: "verifier.jwt", kid = %jwk.kid, error = %err, "Invalid JWK components");
        TokenValidationError::UnknownKeyId
    })
}

/// Verify the RS256 signature and extract claims.
///
/// Expiry, issuer and audience are checked by the caller, so the library's
/// own checks are off.
///
/// The header and claims segments are decoded up front. A base64 failure
/// reported by the library after that can only come from the signature
/// segment, and an altered signature is a signature mismatch however it
/// decodes.
fn verify_signature(token: &str, jwk: &Jwk) -> Result<AccessTokenClaims, TokenValidationError> {
    let key = decoding_key(jwk)?;

    let (header_part, claims_part, _) =
        split_compact(token).map_err(|_| TokenValidationError::Malformed)?;
    for segment in [header_part, claims_part] {
        if let Err(e) = URL_SAFE_NO_PAD.decode(segment) {
            tracing::debug!(target: "verifier.jwt", error = %e, "Token segment is not base64url");
            return Err(TokenValidationError::Malformed);
        }
    }

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;

    decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
                TokenValidationError::SignatureMismatch
            }
            _ => {
                tracing::debug!(target: "verifier.jwt", error = %e, "Token decode failed");
                TokenValidationError::Malformed
            }
        })
}
