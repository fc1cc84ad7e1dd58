//! Signing key loading across every supported encoding
//!
//! The same RSA key is stored as plain PKCS#8, plain PKCS#1, encrypted
//! PKCS#8 and legacy encrypted PKCS#1 (AES-128 and 3DES). Every form must
//! derive the same public modulus and exponent.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::secret::SecretString;
use std::path::PathBuf;
use token_issuer::config::{KeySource, KeySourceConfig};
use token_issuer::errors::KeyLoadError;
use token_issuer::keys::KeyManager;
use token_test_utils::{
    fixture_path, PASSPHRASE, PKCS1_ENCRYPTED_AES128_PEM, PKCS1_ENCRYPTED_DES3_PEM, PKCS1_PEM,
    PKCS8_ENCRYPTED_PEM, PKCS8_PEM, REFERENCE_E, REFERENCE_N,
};

fn passphrase(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[test]
fn test_every_encoding_derives_reference_components() {
    let cases = [
        ("pkcs8", PKCS8_PEM, None),
        ("pkcs1", PKCS1_PEM, None),
        ("pkcs8 encrypted", PKCS8_ENCRYPTED_PEM, Some(passphrase(PASSPHRASE))),
        (
            "pkcs1 aes-128-cbc",
            PKCS1_ENCRYPTED_AES128_PEM,
            Some(passphrase(PASSPHRASE)),
        ),
        (
            "pkcs1 des-ede3-cbc",
            PKCS1_ENCRYPTED_DES3_PEM,
            Some(passphrase(PASSPHRASE)),
        ),
    ];

    for (name, pem, pass) in cases {
        let manager = KeyManager::from_pem(pem, pass.as_ref(), "k1")
            .unwrap_or_else(|e| panic!("{name} should load: {e}"));

        assert_eq!(
            manager.public_components(),
            (REFERENCE_N, REFERENCE_E),
            "{name} derived different public components"
        );
        assert_eq!(manager.key_id(), "k1");
    }
}

#[test]
fn test_wrong_passphrase_is_rejected() {
    let wrong = passphrase("battery-staple");

    for (name, pem) in [
        ("pkcs8 encrypted", PKCS8_ENCRYPTED_PEM),
        ("pkcs1 aes-128-cbc", PKCS1_ENCRYPTED_AES128_PEM),
        ("pkcs1 des-ede3-cbc", PKCS1_ENCRYPTED_DES3_PEM),
    ] {
        let result = KeyManager::from_pem(pem, Some(&wrong), "k1");
        assert!(
            matches!(
                result,
                Err(KeyLoadError::Decrypt) | Err(KeyLoadError::InvalidKey(_))
            ),
            "{name} accepted a wrong passphrase: {result:?}"
        );
    }
}

#[test]
fn test_plain_key_ignores_passphrase() {
    let manager = KeyManager::from_pem(PKCS8_PEM, Some(&passphrase("unused")), "k1").unwrap();
    assert_eq!(manager.public_components().0, REFERENCE_N);
}

#[test]
fn test_load_encrypted_key_from_path() {
    let config = KeySourceConfig {
        source: KeySource::Path(PathBuf::from(fixture_path("rsa_pkcs1_encrypted_aes128.pem"))),
        passphrase: Some(passphrase(PASSPHRASE)),
        key_id: "k1".to_string(),
    };

    let manager = KeyManager::load(&config).unwrap();
    assert_eq!(manager.public_components(), (REFERENCE_N, REFERENCE_E));
}

#[test]
fn test_load_inline_base64_encrypted_key() {
    let config = KeySourceConfig {
        source: KeySource::Inline(SecretString::from(STANDARD.encode(PKCS8_ENCRYPTED_PEM))),
        passphrase: Some(passphrase(PASSPHRASE)),
        key_id: "k1".to_string(),
    };

    let manager = KeyManager::load(&config).unwrap();
    assert_eq!(manager.public_components(), (REFERENCE_N, REFERENCE_E));
}

#[test]
fn test_garbage_content_is_rejected() {
    let result = KeyManager::from_pem("this is not a key", None, "k1");
    assert!(result.is_err());
}

#[test]
fn test_mislabelled_blocks_load_by_der_shape() {
    let pkcs1_der = pem::parse(PKCS1_PEM).unwrap().into_contents();
    let as_pkcs8_label = pem::encode(&pem::Pem::new("PRIVATE KEY", pkcs1_der));

    let pkcs8_der = pem::parse(PKCS8_PEM).unwrap().into_contents();
    let as_pkcs1_label = pem::encode(&pem::Pem::new("RSA PRIVATE KEY", pkcs8_der));

    for text in [as_pkcs8_label, as_pkcs1_label] {
        let manager = KeyManager::from_pem(&text, None, "k1").unwrap();
        assert_eq!(manager.public_components(), (REFERENCE_N, REFERENCE_E));
    }
}
