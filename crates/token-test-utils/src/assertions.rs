//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over compact access tokens. They decode
//! without verifying; pair them with a real verification in the test.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// Access token claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub roles: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Custom assertions for access tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by("k1")
///     .assert_for_subject("42")
///     .assert_has_role("USER")
///     .assert_lifetime(900);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is an RS256 JWT in compact form
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the header carries the given `kid`
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert the `sub` claim
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert the `roles` claim
    fn assert_has_role(&self, role: &str) -> &Self;

    /// Assert the `iss` claim
    fn assert_issued_by(&self, issuer: &str) -> &Self;

    /// Assert that `exp - iat` equals the given number of seconds
    fn assert_lifetime(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = decode_header(self);
        assert_eq!(header.alg, "RS256", "JWT must use RS256");
        assert_eq!(header.typ, "JWT", "JWT typ must be JWT");
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = decode_header(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Token should be signed by key {key_id}"
        );
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        assert_eq!(decode_claims(self).sub, subject, "Token subject mismatch");
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        assert_eq!(decode_claims(self).roles, role, "Token role mismatch");
        self
    }

    fn assert_issued_by(&self, issuer: &str) -> &Self {
        assert_eq!(decode_claims(self).iss, issuer, "Token issuer mismatch");
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Token lifetime should be {seconds}s"
        );
        self
    }
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("JWT segment {index} is not base64url: {e}"))
}

fn decode_header(token: &str) -> JwtHeader {
    serde_json::from_slice(&segment(token, 0)).expect("JWT header must be valid JSON")
}

fn decode_claims(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1)).expect("JWT claims must be valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_builders::TestTokenBuilder;

    #[test]
    fn test_assertions_chain_on_builder_token() {
        let token = TestTokenBuilder::new()
            .for_subject("42")
            .with_role("USER")
            .expires_at(1_000 + 900)
            .with_claim("iat", serde_json::json!(1_000))
            .sign();

        token
            .assert_valid_jwt()
            .assert_signed_by("k1")
            .assert_for_subject("42")
            .assert_has_role("USER")
            .assert_issued_by("https://issuer.example")
            .assert_lifetime(900);
    }

    #[test]
    #[should_panic(expected = "Token subject mismatch")]
    fn test_subject_mismatch_panics() {
        TestTokenBuilder::new()
            .for_subject("42")
            .sign()
            .assert_for_subject("7");
    }
}
