//! JSON Web Key Set wire format (RFC 7517), RSA keys only.
//!
//! The issuer renders one of these at `/.well-known/jwks.json`; verifiers
//! fetch and cache it. Unknown members are ignored on input so that a key set
//! carrying extra metadata (`x5c`, `key_ops`, ...) still parses.

use serde::{Deserialize, Serialize};

/// JWK key type for RSA keys.
pub const KEY_TYPE_RSA: &str = "RSA";

/// JWK `use` value for signing keys.
pub const KEY_USE_SIGNATURE: &str = "sig";

/// A single public key entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (always "RSA" for keys this system issues).
    pub kty: String,

    /// Key ID, matched against the token header `kid`.
    pub kid: String,

    /// Modulus, base64url without padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// Public exponent, base64url without padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// Algorithm (should be "RS256").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Key use (should be "sig").
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

/// The key set document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    /// Published keys.
    pub keys: Vec<Jwk>,
}

impl Jwks {
    /// Look up a key by `kid`.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}
