//! Issue-then-verify round trips
//!
//! Tokens minted by `TokenIssuer` are verified by the `token-verifier` crate
//! against the key set `JwksPublisher` renders, served from a mock JWKS
//! endpoint.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::secret::SecretString;
use std::sync::Arc;
use std::time::Duration;
use token_issuer::keys::KeyManager;
use token_issuer::services::jwks_publisher::JwksPublisher;
use token_issuer::services::token_issuer::TokenIssuer;
use token_test_utils::{
    tamper_signature, JwksMock, TokenAssertions, OTHER_PKCS8_PEM, PASSPHRASE,
    PKCS1_ENCRYPTED_DES3_PEM, PKCS8_PEM,
};
use token_verifier::{Identity, JwksClient, JwtValidator, TokenValidationError};

const ISSUER: &str = "https://issuer.example";

fn key_manager(pem: &str, kid: &str) -> Arc<KeyManager> {
    Arc::new(KeyManager::from_pem(pem, None, kid).expect("fixture key should load"))
}

async fn publish(keys: &Arc<KeyManager>) -> JwksMock {
    JwksMock::start(JwksPublisher::new(Arc::clone(keys)).publish()).await
}

fn validator_for(mock: &JwksMock) -> JwtValidator {
    let client = JwksClient::new(mock.uri(), Duration::from_secs(3600), Duration::from_secs(5))
        .expect("client should build");
    JwtValidator::new(Arc::new(client), ISSUER.to_string())
}

#[tokio::test]
async fn test_reference_scenario() {
    let keys = key_manager(PKCS8_PEM, "k1");
    let mock = publish(&keys).await;
    let issuer = TokenIssuer::new(Arc::clone(&keys), ISSUER, 15).unwrap();

    let token = issuer.issue_access_token("42", "alice", "USER").unwrap();

    token
        .assert_valid_jwt()
        .assert_signed_by("k1")
        .assert_issued_by(ISSUER)
        .assert_lifetime(15 * 60);

    let identity = validator_for(&mock).verify(&token).await.unwrap();
    assert_eq!(
        identity,
        Identity {
            subject: "42".to_string(),
            username: Some("alice".to_string()),
            authorities: vec!["ROLE_USER".to_string()],
        }
    );
}

#[tokio::test]
async fn test_round_trip_preserves_principal() {
    let keys = key_manager(PKCS8_PEM, "k1");
    let mock = publish(&keys).await;
    let issuer = TokenIssuer::new(Arc::clone(&keys), ISSUER, 5).unwrap();
    let validator = validator_for(&mock);

    for (subject, username, role) in [
        ("1", "bob", "ADMIN"),
        ("987654321", "carol.smith@example.com", "MODERATOR"),
        ("7", "dave", "user"),
    ] {
        let token = issuer.issue_access_token(subject, username, role).unwrap();
        let identity = validator.verify(&token).await.unwrap();

        assert_eq!(identity.subject, subject);
        assert_eq!(identity.username.as_deref(), Some(username));
        assert_eq!(
            identity.authorities,
            vec![format!("ROLE_{}", role.to_uppercase())]
        );
    }
}

#[tokio::test]
async fn test_round_trip_with_encrypted_key() {
    let passphrase = SecretString::from(PASSPHRASE.to_string());
    let keys = Arc::new(KeyManager::from_pem(PKCS1_ENCRYPTED_DES3_PEM, Some(&passphrase), "k1").unwrap());
    let mock = publish(&keys).await;
    let issuer = TokenIssuer::new(Arc::clone(&keys), ISSUER, 15).unwrap();

    let token = issuer.issue_access_token("42", "alice", "USER").unwrap();
    assert!(validator_for(&mock).verify(&token).await.is_ok());
}

#[tokio::test]
async fn test_tampered_issued_token_is_rejected() {
    let keys = key_manager(PKCS8_PEM, "k1");
    let mock = publish(&keys).await;
    let issuer = TokenIssuer::new(Arc::clone(&keys), ISSUER, 15).unwrap();

    let token = issuer.issue_access_token("42", "alice", "USER").unwrap();

    assert_eq!(
        validator_for(&mock).verify(&tamper_signature(&token)).await,
        Err(TokenValidationError::SignatureMismatch)
    );
}

#[tokio::test]
async fn test_token_from_unpublished_key_is_rejected() {
    let published = key_manager(PKCS8_PEM, "k1");
    let mock = publish(&published).await;

    // Same kid, different private key
    let rogue = TokenIssuer::new(key_manager(OTHER_PKCS8_PEM, "k1"), ISSUER, 15).unwrap();
    let token = rogue.issue_access_token("42", "alice", "ADMIN").unwrap();

    assert_eq!(
        validator_for(&mock).verify(&token).await,
        Err(TokenValidationError::SignatureMismatch)
    );
}

#[tokio::test]
async fn test_verifier_with_other_expected_issuer_rejects() {
    let keys = key_manager(PKCS8_PEM, "k1");
    let mock = publish(&keys).await;
    let issuer = TokenIssuer::new(Arc::clone(&keys), "https://other.example", 15).unwrap();

    let token = issuer.issue_access_token("42", "alice", "USER").unwrap();

    assert_eq!(
        validator_for(&mock).verify(&token).await,
        Err(TokenValidationError::IssuerMismatch)
    );
}

#[tokio::test]
async fn test_rotated_signing_key_is_picked_up_after_refresh() {
    let old_keys = key_manager(PKCS8_PEM, "k1");
    let new_keys = key_manager(OTHER_PKCS8_PEM, "k2");

    let mock = JwksMock::empty().await;
    mock.serve_times(&JwksPublisher::new(Arc::clone(&old_keys)).publish(), 1)
        .await;
    mock.serve(&JwksPublisher::new(Arc::clone(&new_keys)).publish(), Some(1), None)
        .await;

    let client = Arc::new(
        JwksClient::new(mock.uri(), Duration::from_secs(3600), Duration::from_secs(5)).unwrap(),
    );
    let validator = JwtValidator::new(Arc::clone(&client), ISSUER.to_string());

    let old_token = TokenIssuer::new(old_keys, ISSUER, 15)
        .unwrap()
        .issue_access_token("42", "alice", "USER")
        .unwrap();
    let new_token = TokenIssuer::new(new_keys, ISSUER, 15)
        .unwrap()
        .issue_access_token("42", "alice", "USER")
        .unwrap();

    assert!(validator.verify(&old_token).await.is_ok());
    assert_eq!(
        validator.verify(&new_token).await,
        Err(TokenValidationError::UnknownKeyId)
    );

    client.refresh_cache().await;

    assert!(validator.verify(&new_token).await.is_ok());
}
