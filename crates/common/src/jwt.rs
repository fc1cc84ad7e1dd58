//! JWT utilities shared by the issuer and verifier.
//!
//! This module provides:
//! - Size limits for DoS prevention
//! - Compact-serialization parsing and key ID extraction from JWT headers
//! - Bearer credential extraction from an `Authorization` header value
//! - Wire-format constants (algorithm, token type, role prefix)
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Nothing here verifies a signature; callers MUST verify after key lookup
//! - Error messages are generic to avoid a verification oracle

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// An RS256 token with the standard claim set is roughly 600 bytes. Anything
/// past this limit is rejected before base64 decoding or signature work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// The only JWS algorithm issued and accepted.
pub const JWT_ALGORITHM: &str = "RS256";

/// JOSE `typ` header value.
pub const JWT_TYPE: &str = "JWT";

/// Prefix applied to the `roles` claim to form an authority.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Authentication scheme expected in the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while parsing a compact JWT.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not a valid compact serialization.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token header has no usable `kid`.
    #[error("The access token is invalid or expired")]
    MissingKid,
}

// =============================================================================
// Functions
// =============================================================================

/// Split a compact JWT into its three segments.
///
/// Rejects oversized input and anything that is not exactly
/// `header.claims.signature` with non-empty segments.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - wrong segment count or an empty segment
pub fn split_compact(token: &str) -> Result<(&str, &str, &str), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(claims), Some(signature), None)
            if !header.is_empty() && !claims.is_empty() && !signature.is_empty() =>
        {
            Ok((header, claims, signature))
        }
        _ => {
            tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
            Err(JwtValidationError::MalformedToken)
        }
    }
}

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// The returned value must only be used to look up a key in a trusted JWKS.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds size limit
/// - `MalformedToken` - wrong structure, bad base64 or invalid header JSON
/// - `MissingKid` - header has no `kid`, or it is empty or not a string
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    let (header_part, _, _) = split_compact(token)?;

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    if !header.is_object() {
        return Err(JwtValidationError::MalformedToken);
    }

    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::MissingKid)
}

/// Extract a bearer token from an `Authorization` header value.
///
/// Returns `None` when the header is absent, uses another scheme, or carries
/// an empty credential. `None` means "no token found"; whether that is an
/// error is the caller's access policy.
#[must_use]
pub fn extract_bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Turn a role name into an authority string (`USER` -> `ROLE_USER`).
#[must_use]
pub fn role_authority(role: &str) -> String {
    format!("{ROLE_PREFIX}{role}")
}

// =============================================================================
// Tests
// =============================================================================
