//! OpenSSL "traditional" encrypted PEM (`Proc-Type: 4,ENCRYPTED`).
//!
//! The key is derived with `EVP_BytesToKey` (MD5, one round, salt = first 8
//! bytes of the IV) and the body is CBC with PKCS#7 padding.

use crate::errors::KeyLoadError;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use md5::{Digest, Md5};

const SALT_LEN: usize = 8;

/// Ciphers OpenSSL writes into `DEK-Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyCipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
}

impl LegacyCipher {
    pub fn from_dek_info(name: &str) -> Result<Self, KeyLoadError> {
        match name {
            "AES-128-CBC" => Ok(LegacyCipher::Aes128Cbc),
            "AES-192-CBC" => Ok(LegacyCipher::Aes192Cbc),
            "AES-256-CBC" => Ok(LegacyCipher::Aes256Cbc),
            "DES-EDE3-CBC" => Ok(LegacyCipher::DesEde3Cbc),
            other => Err(KeyLoadError::UnsupportedCipher(other.to_string())),
        }
    }

    fn key_len(self) -> usize {
        match self {
            LegacyCipher::Aes128Cbc => 16,
            LegacyCipher::Aes192Cbc | LegacyCipher::DesEde3Cbc => 24,
            LegacyCipher::Aes256Cbc => 32,
        }
    }

    fn iv_len(self) -> usize {
        match self {
            LegacyCipher::DesEde3Cbc => 8,
            _ => 16,
        }
    }
}

/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration.
pub fn evp_bytes_to_key(passphrase: &[u8], salt: &[u8], key_len: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(key_len + 16);
    let mut previous: Option<Vec<u8>> = None;

    while key.len() < key_len {
        let mut hasher = Md5::new();
        if let Some(block) = &previous {
            hasher.update(block);
        }
        hasher.update(passphrase);
        hasher.update(salt);
        let block = hasher.finalize().to_vec();
        key.extend_from_slice(&block);
        previous = Some(block);
    }

    key.truncate(key_len);
    key
}

/// Decrypt a legacy PEM body to PKCS#1 DER.
///
/// A wrong passphrase almost always shows up as a padding failure here;
/// the rare case that unpads cleanly is caught later when the DER is parsed.
pub fn decrypt(
    cipher_name: &str,
    iv: &[u8],
    ciphertext: &[u8],
    passphrase: &[u8],
) -> Result<Vec<u8>, KeyLoadError> {
    let cipher = LegacyCipher::from_dek_info(cipher_name)?;

    if iv.len() != cipher.iv_len() {
        return Err(KeyLoadError::Pem(format!(
            "DEK-Info IV has {} bytes, expected {}",
            iv.len(),
            cipher.iv_len()
        )));
    }

    let salt = iv.get(..SALT_LEN).ok_or(KeyLoadError::Decrypt)?;
    let key = evp_bytes_to_key(passphrase, salt, cipher.key_len());

    match cipher {
        LegacyCipher::Aes128Cbc => cbc_decrypt::<aes::Aes128>(&key, iv, ciphertext),
        LegacyCipher::Aes192Cbc => cbc_decrypt::<aes::Aes192>(&key, iv, ciphertext),
        LegacyCipher::Aes256Cbc => cbc_decrypt::<aes::Aes256>(&key, iv, ciphertext),
        LegacyCipher::DesEde3Cbc => cbc_decrypt::<des::TdesEde3>(&key, iv, ciphertext),
    }
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, KeyLoadError>
where
    C: cbc::cipher::BlockDecryptMut + cbc::cipher::BlockCipher + cbc::cipher::KeyInit,
{
    cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| KeyLoadError::Decrypt)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| KeyLoadError::Decrypt)
}
