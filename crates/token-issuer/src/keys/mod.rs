//! Signing key lifecycle.
//!
//! [`KeyManager::load`] reads the configured key once, decrypts it if needed,
//! checks it and keeps the material for the life of the process. Nothing in
//! here mutates after load, so the manager is shared through `Arc` without
//! locking.

pub mod legacy;
pub mod pem;

use crate::config::{KeySource, KeySourceConfig};
use crate::errors::KeyLoadError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::EncodingKey;
use pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use tracing::instrument;

use self::pem::KeyEncoding;

/// A loaded RSA signing key and everything derived from it.
pub struct SigningKeyMaterial {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    key_id: String,
    n: String,
    e: String,
    encoding_key: EncodingKey,
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("key_id", &self.key_id)
            .field("private_key", &"[REDACTED]")
            .field("modulus_bits", &(self.public_key.size() * 8))
            .finish()
    }
}

/// Owner of the process signing key.
#[derive(Debug)]
pub struct KeyManager {
    material: SigningKeyMaterial,
}

impl KeyManager {
    /// Load and check the configured signing key.
    ///
    /// # Errors
    ///
    /// Any [`KeyLoadError`]. Callers at startup must treat it as fatal.
    #[instrument(skip_all)]
    pub fn load(config: &KeySourceConfig) -> Result<Self, KeyLoadError> {
        let pem_text = read_source(&config.source)?;
        let manager = Self::from_pem(&pem_text, config.passphrase.as_ref(), &config.key_id)?;

        tracing::info!(
            target: "issuer.keys",
            kid = %config.key_id,
            modulus_bits = manager.material.public_key.size() * 8,
            "Signing key loaded"
        );

        Ok(manager)
    }

    /// Build a manager from PEM text already in memory.
    #[instrument(skip_all)]
    pub fn from_pem(
        pem_text: &str,
        passphrase: Option<&SecretString>,
        key_id: &str,
    ) -> Result<Self, KeyLoadError> {
        let encoding = pem::classify(pem_text)?;
        tracing::debug!(target: "issuer.keys", encoding = encoding.kind(), "Classified signing key");

        let passphrase = if encoding.is_encrypted() {
            Some(require_passphrase(passphrase)?)
        } else {
            None
        };

        let private_key = match encoding {
            KeyEncoding::Pkcs8Plain(der) => rsa_from_pkcs8(&der)?,
            KeyEncoding::Pkcs1Plain(der) => rsa_from_pkcs1(&der)?,
            KeyEncoding::Pkcs8Encrypted(der) => {
                let passphrase = passphrase.ok_or(KeyLoadError::MissingPassphrase)?;
                let info = EncryptedPrivateKeyInfo::try_from(der.as_slice())
                    .map_err(|e| KeyLoadError::InvalidKey(e.to_string()))?;
                let document = info
                    .decrypt(passphrase.expose_secret().as_bytes())
                    .map_err(|_| KeyLoadError::Decrypt)?;
                rsa_from_pkcs8(document.as_bytes())?
            }
            KeyEncoding::Pkcs1EncryptedLegacy {
                cipher,
                iv,
                ciphertext,
            } => {
                let passphrase = passphrase.ok_or(KeyLoadError::MissingPassphrase)?;
                let der = legacy::decrypt(
                    &cipher,
                    &iv,
                    &ciphertext,
                    passphrase.expose_secret().as_bytes(),
                )?;
                rsa_from_pkcs1(&der)?
            }
        };

        let material = SigningKeyMaterial::new(private_key, key_id)?;
        Ok(KeyManager { material })
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.material.private_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.material.public_key
    }

    pub fn key_id(&self) -> &str {
        &self.material.key_id
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.material.encoding_key
    }

    /// Modulus and exponent as unpadded base64url, ready for a JWK.
    pub fn public_components(&self) -> (&str, &str) {
        (&self.material.n, &self.material.e)
    }
}

impl SigningKeyMaterial {
    fn new(mut private_key: RsaPrivateKey, key_id: &str) -> Result<Self, KeyLoadError> {
        private_key
            .validate()
            .map_err(|e| KeyLoadError::InvalidKey(e.to_string()))?;

        // Derive CRT values when the encoding left them out
        private_key
            .precompute()
            .map_err(|_| KeyLoadError::MissingCrtParameters)?;
        if private_key.dp().is_none() || private_key.dq().is_none() {
            return Err(KeyLoadError::MissingCrtParameters);
        }

        let public_key = private_key.to_public_key();
        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        let der = private_key
            .to_pkcs1_der()
            .map_err(|e| KeyLoadError::InvalidKey(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

        Ok(SigningKeyMaterial {
            private_key,
            public_key,
            key_id: key_id.to_string(),
            n,
            e,
            encoding_key,
        })
    }
}

fn read_source(source: &KeySource) -> Result<String, KeyLoadError> {
    match source {
        KeySource::Inline(content) => pem::decode_inline(content.expose_secret()),
        KeySource::Path(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                tracing::error!(
                    target: "issuer.keys",
                    path = %path.display(),
                    error = %e,
                    "Failed to read signing key file"
                );
                KeyLoadError::Io(e)
            })?;
            Ok(text)
        }
    }
}

fn require_passphrase(passphrase: Option<&SecretString>) -> Result<&SecretString, KeyLoadError> {
    match passphrase {
        Some(p) if !p.expose_secret().trim().is_empty() => Ok(p),
        _ => {
            tracing::error!(
                target: "issuer.keys",
                "Signing key is encrypted but no passphrase is configured"
            );
            Err(KeyLoadError::MissingPassphrase)
        }
    }
}

fn rsa_from_pkcs8(der: &[u8]) -> Result<RsaPrivateKey, KeyLoadError> {
    let info =
        PrivateKeyInfo::try_from(der).map_err(|e| KeyLoadError::InvalidKey(e.to_string()))?;

    if info.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
        return Err(KeyLoadError::UnsupportedAlgorithm(
            info.algorithm.oid.to_string(),
        ));
    }

    RsaPrivateKey::from_pkcs8_der(der).map_err(|e| KeyLoadError::InvalidKey(e.to_string()))
}

fn rsa_from_pkcs1(der: &[u8]) -> Result<RsaPrivateKey, KeyLoadError> {
    RsaPrivateKey::from_pkcs1_der(der).map_err(|e| KeyLoadError::InvalidKey(e.to_string()))
}
