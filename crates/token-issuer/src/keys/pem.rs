//! PEM block classification.
//!
//! A signing key arrives in one of four shapes; the label and the RFC 1421
//! headers decide which.

use crate::errors::KeyLoadError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

const PEM_BEGIN_MARKER: &str = "-----BEGIN";

const LABEL_PKCS8: &str = "PRIVATE KEY";
const LABEL_PKCS8_ENCRYPTED: &str = "ENCRYPTED PRIVATE KEY";
const LABEL_PKCS1: &str = "RSA PRIVATE KEY";

const HEADER_PROC_TYPE: &str = "Proc-Type";
const HEADER_DEK_INFO: &str = "DEK-Info";
const PROC_TYPE_ENCRYPTED: &str = "4,ENCRYPTED";

/// Parsed private key container, one variant per supported encoding.
pub enum KeyEncoding {
    /// `PRIVATE KEY`: unencrypted PKCS#8 `PrivateKeyInfo`.
    Pkcs8Plain(Vec<u8>),
    /// `RSA PRIVATE KEY` without encryption headers: PKCS#1 `RSAPrivateKey`.
    Pkcs1Plain(Vec<u8>),
    /// `ENCRYPTED PRIVATE KEY`: PKCS#8 `EncryptedPrivateKeyInfo`.
    Pkcs8Encrypted(Vec<u8>),
    /// `RSA PRIVATE KEY` with `Proc-Type: 4,ENCRYPTED` and `DEK-Info`.
    Pkcs1EncryptedLegacy {
        cipher: String,
        iv: Vec<u8>,
        ciphertext: Vec<u8>,
    },
}

impl KeyEncoding {
    /// Whether a passphrase is needed to get at the key.
    pub fn is_encrypted(&self) -> bool {
        matches!(
            self,
            KeyEncoding::Pkcs8Encrypted(_) | KeyEncoding::Pkcs1EncryptedLegacy { .. }
        )
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            KeyEncoding::Pkcs8Plain(_) => "pkcs8",
            KeyEncoding::Pkcs1Plain(_) => "pkcs1",
            KeyEncoding::Pkcs8Encrypted(_) => "pkcs8_encrypted",
            KeyEncoding::Pkcs1EncryptedLegacy { .. } => "pkcs1_encrypted_legacy",
        }
    }
}

impl fmt::Debug for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEncoding::Pkcs1EncryptedLegacy { cipher, .. } => f
                .debug_struct("Pkcs1EncryptedLegacy")
                .field("cipher", cipher)
                .field("iv", &"[REDACTED]")
                .field("ciphertext", &"[REDACTED]")
                .finish(),
            other => f.debug_tuple(other.kind()).field(&"[REDACTED]").finish(),
        }
    }
}

/// Turn inline key content into PEM text.
///
/// Content that already contains a PEM begin marker is used as is. Anything
/// else is treated as standard base64 of PEM text (whitespace ignored).
pub fn decode_inline(content: &str) -> Result<String, KeyLoadError> {
    let trimmed = content.trim();
    if trimmed.contains(PEM_BEGIN_MARKER) {
        return Ok(trimmed.to_string());
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = STANDARD
        .decode(compact)
        .map_err(|_| KeyLoadError::Pem("inline content is neither PEM nor base64".to_string()))?;
    let text = String::from_utf8(decoded)
        .map_err(|_| KeyLoadError::Pem("decoded inline content is not text".to_string()))?;

    if !text.contains(PEM_BEGIN_MARKER) {
        return Err(KeyLoadError::Pem(
            "decoded inline content has no PEM block".to_string(),
        ));
    }

    Ok(text)
}

/// Parse the first PEM block and classify it.
///
/// Unencrypted blocks are classified by the shape of their DER: a
/// `PrivateKeyInfo` is PKCS#8 and an `RSAPrivateKey` is PKCS#1, whichever of
/// the two labels the block carries. The label decides only when neither
/// structure parses.
pub fn classify(pem_text: &str) -> Result<KeyEncoding, KeyLoadError> {
    let block = ::pem::parse(pem_text).map_err(|e| KeyLoadError::Pem(e.to_string()))?;

    match block.tag() {
        LABEL_PKCS8 => Ok(classify_plain(block.into_contents(), true)),
        LABEL_PKCS8_ENCRYPTED => Ok(KeyEncoding::Pkcs8Encrypted(block.into_contents())),
        LABEL_PKCS1 => classify_pkcs1(block),
        other => Err(KeyLoadError::UnsupportedKeyFormat(other.to_string())),
    }
}

fn classify_plain(der: Vec<u8>, labelled_pkcs8: bool) -> KeyEncoding {
    let is_pkcs8 = pkcs8::PrivateKeyInfo::try_from(der.as_slice()).is_ok();
    let is_pkcs1 = !is_pkcs8 && rsa::pkcs1::RsaPrivateKey::try_from(der.as_slice()).is_ok();

    if is_pkcs8 || (labelled_pkcs8 && !is_pkcs1) {
        KeyEncoding::Pkcs8Plain(der)
    } else {
        KeyEncoding::Pkcs1Plain(der)
    }
}

fn classify_pkcs1(block: ::pem::Pem) -> Result<KeyEncoding, KeyLoadError> {
    let encrypted = block
        .headers()
        .get(HEADER_PROC_TYPE)
        .is_some_and(|v| v.trim() == PROC_TYPE_ENCRYPTED);

    if !encrypted {
        return Ok(classify_plain(block.into_contents(), false));
    }

    let dek_info = block
        .headers()
        .get(HEADER_DEK_INFO)
        .ok_or_else(|| KeyLoadError::Pem("encrypted key has no DEK-Info header".to_string()))?;

    let (cipher, iv_hex) = dek_info
        .split_once(',')
        .ok_or_else(|| KeyLoadError::Pem("malformed DEK-Info header".to_string()))?;
    let cipher = cipher.trim().to_ascii_uppercase();
    let iv = hex::decode(iv_hex.trim())
        .map_err(|_| KeyLoadError::Pem("DEK-Info IV is not hex".to_string()))?;

    Ok(KeyEncoding::Pkcs1EncryptedLegacy {
        cipher,
        iv,
        ciphertext: block.into_contents(),
    })
}
