use crate::keys::KeyManager;
use common::jwks::{Jwk, Jwks, KEY_TYPE_RSA, KEY_USE_SIGNATURE};
use common::jwt::JWT_ALGORITHM;
use std::sync::Arc;

/// Renders the public half of the signing key as a JWKS document.
#[derive(Debug, Clone)]
pub struct JwksPublisher {
    keys: Arc<KeyManager>,
}

impl JwksPublisher {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }

    /// The key set: exactly one RSA signing key.
    pub fn publish(&self) -> Jwks {
        let (n, e) = self.keys.public_components();

        Jwks {
            keys: vec![Jwk {
                kty: KEY_TYPE_RSA.to_string(),
                kid: self.keys.key_id().to_string(),
                n: Some(n.to_string()),
                e: Some(e.to_string()),
                alg: Some(JWT_ALGORITHM.to_string()),
                key_use: Some(KEY_USE_SIGNATURE.to_string()),
            }],
        }
    }

    /// The key set as served at `/.well-known/jwks.json`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.publish())
    }
}
