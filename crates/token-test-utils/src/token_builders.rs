//! Builder patterns for test data construction
//!
//! Provides a fluent API for signing arbitrary access tokens, including
//! malformed and expired ones that the issuer would never produce.

use crate::crypto_fixtures::PKCS8_PEM;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for signed test JWTs
///
/// Defaults: reference key, `kid` "k1", issuer `https://issuer.example`,
/// subject "42", username "alice", role "USER", 15 minute lifetime.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("42")
///     .with_role("ADMIN")
///     .expires_in(-60)
///     .sign();
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
    kid: Option<String>,
    private_key_pem: String,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("42"));
        claims.insert("username".to_string(), json!("alice"));
        claims.insert("roles".to_string(), json!("USER"));
        claims.insert("iss".to_string(), json!("https://issuer.example"));
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::minutes(15)).timestamp()),
        );

        Self {
            claims,
            kid: Some("k1".to_string()),
            private_key_pem: PKCS8_PEM.to_string(),
        }
    }

    /// Set the subject
    pub fn for_subject(self, subject: &str) -> Self {
        self.with_claim("sub", json!(subject))
    }

    /// Set the username
    pub fn with_username(self, username: &str) -> Self {
        self.with_claim("username", json!(username))
    }

    /// Set the role (written to `roles` as given)
    pub fn with_role(self, role: &str) -> Self {
        self.with_claim("roles", json!(role))
    }

    /// Set the issuer
    pub fn with_issuer(self, issuer: &str) -> Self {
        self.with_claim("iss", json!(issuer))
    }

    /// Set expiration in seconds from now (negative for an expired token)
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.with_claim("exp", json!(exp))
    }

    /// Set the `exp` claim to an exact timestamp
    pub fn expires_at(self, timestamp: i64) -> Self {
        self.with_claim("exp", json!(timestamp))
    }

    /// Set or replace any claim
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim entirely
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Set the header `kid`
    pub fn with_kid(mut self, kid: &str) -> Self {
        self.kid = Some(kid.to_string());
        self
    }

    /// Leave `kid` out of the header
    pub fn without_kid(mut self) -> Self {
        self.kid = None;
        self
    }

    /// Sign with a different RSA private key (PEM)
    pub fn signed_with(mut self, private_key_pem: &str) -> Self {
        self.private_key_pem = private_key_pem.to_string();
        self
    }

    /// Build the claims as a JSON value
    pub fn build(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign the claims with RS256
    pub fn sign(self) -> String {
        let key = EncodingKey::from_rsa_pem(self.private_key_pem.as_bytes())
            .expect("test private key must be valid RSA PEM");
        encode(&self.header(Algorithm::RS256), &self.build(), &key)
            .expect("signing test token must succeed")
    }

    /// Sign the claims with HS256 (for algorithm confusion tests)
    pub fn sign_hs256(self, secret: &[u8]) -> String {
        let key = EncodingKey::from_secret(secret);
        encode(&self.header(Algorithm::HS256), &self.build(), &key)
            .expect("signing test token must succeed")
    }

    fn header(&self, alg: Algorithm) -> Header {
        let mut header = Header::new(alg);
        header.typ = Some("JWT".to_string());
        header.kid = self.kid.clone();
        header
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace one character in the middle of the signature segment.
///
/// The result is still valid base64url, so verification fails on the
/// signature itself rather than on decoding.
pub fn tamper_signature(token: &str) -> String {
    let length = signature_length(token);
    tamper_signature_at(token, length / 2)
}

/// Replace the signature character at `position` with a different base64url
/// character.
///
/// Near the end of the segment the replacement may leave non-zero trailing
/// bits, which strict decoders reject.
pub fn tamper_signature_at(token: &str, position: usize) -> String {
    let (signed_part, signature) = token
        .rsplit_once('.')
        .expect("token must have a signature segment");

    let mut chars: Vec<char> = signature.chars().collect();
    let current = chars
        .get_mut(position)
        .expect("position must be inside the signature segment");
    *current = if *current == 'A' { 'B' } else { 'A' };

    format!("{}.{}", signed_part, chars.into_iter().collect::<String>())
}

/// Number of characters in the signature segment.
pub fn signature_length(token: &str) -> usize {
    token
        .rsplit_once('.')
        .map(|(_, signature)| signature.chars().count())
        .expect("token must have a signature segment")
}
