//! Token pair lifecycle: login, refresh, logout
//!
//! Drives `TokenPairService` over the in-memory store and checks the access
//! tokens with the verifier.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;
use token_issuer::keys::KeyManager;
use token_issuer::models::{Principal, TOKEN_TYPE_BEARER};
use token_issuer::repositories::refresh_tokens::InMemoryRefreshTokenStore;
use token_issuer::services::jwks_publisher::JwksPublisher;
use token_issuer::services::refresh_token_service::RefreshTokenService;
use token_issuer::services::session_service::TokenPairService;
use token_issuer::services::token_issuer::TokenIssuer;
use token_test_utils::{JwksMock, PKCS8_PEM};
use token_verifier::{JwksClient, JwtValidator};

const ISSUER: &str = "https://issuer.example";
const TEST_BCRYPT_COST: u32 = 4;

struct Harness {
    service: TokenPairService,
    store: Arc<InMemoryRefreshTokenStore>,
    validator: JwtValidator,
    _jwks: JwksMock,
}

async fn harness() -> Harness {
    let keys = Arc::new(KeyManager::from_pem(PKCS8_PEM, None, "k1").unwrap());
    let jwks = JwksMock::start(JwksPublisher::new(Arc::clone(&keys)).publish()).await;

    let store = Arc::new(InMemoryRefreshTokenStore::new());
    let service = TokenPairService::new(
        TokenIssuer::new(keys, ISSUER, 15).unwrap(),
        RefreshTokenService::new(store.clone(), 30, TEST_BCRYPT_COST),
    );

    let client = JwksClient::new(jwks.uri(), Duration::from_secs(3600), Duration::from_secs(5))
        .unwrap();
    let validator = JwtValidator::new(Arc::new(client), ISSUER.to_string());

    Harness {
        service,
        store,
        validator,
        _jwks: jwks,
    }
}

fn alice() -> Principal {
    Principal::new("42", "alice", "USER")
}

#[tokio::test]
async fn test_login_issues_verifiable_pair() {
    let h = harness().await;

    let response = h.service.issue_pair(&alice()).await.unwrap();

    assert_eq!(response.token_type, TOKEN_TYPE_BEARER);
    assert_eq!(response.expires_in, 900);
    assert_eq!(response.refresh_token.len(), 43);
    assert_eq!(h.store.active_count("42").await, 1);

    let identity = h.validator.verify(&response.access_token).await.unwrap();
    assert_eq!(identity.subject, "42");
}

#[tokio::test]
async fn test_refresh_rotates_and_old_token_is_dead() {
    let h = harness().await;
    let first = h.service.issue_pair(&alice()).await.unwrap();

    let second = h
        .service
        .refresh(&alice(), &first.refresh_token)
        .await
        .unwrap()
        .expect("current refresh token should rotate");

    assert_ne!(first.refresh_token, second.refresh_token);
    assert!(h.validator.verify(&second.access_token).await.is_ok());
    assert_eq!(h.store.active_count("42").await, 1);

    // Replaying the rotated token is rejected
    assert!(h
        .service
        .refresh(&alice(), &first.refresh_token)
        .await
        .unwrap()
        .is_none());

    // The new one still works
    assert!(h
        .service
        .refresh(&alice(), &second.refresh_token)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_new_login_supersedes_previous_refresh_token() {
    let h = harness().await;
    let first = h.service.issue_pair(&alice()).await.unwrap();
    let _second = h.service.issue_pair(&alice()).await.unwrap();

    assert_eq!(h.store.active_count("42").await, 1);
    assert!(h
        .service
        .refresh(&alice(), &first.refresh_token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_refresh_token_is_bound_to_subject() {
    let h = harness().await;
    let response = h.service.issue_pair(&alice()).await.unwrap();

    let mallory = Principal::new("43", "mallory", "USER");
    assert!(h
        .service
        .refresh(&mallory, &response.refresh_token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let h = harness().await;
    let response = h.service.issue_pair(&alice()).await.unwrap();

    assert_eq!(h.service.logout("42").await.unwrap(), 1);
    assert_eq!(h.store.active_count("42").await, 0);
    assert!(h
        .service
        .refresh(&alice(), &response.refresh_token)
        .await
        .unwrap()
        .is_none());

    assert_eq!(h.service.logout("42").await.unwrap(), 0);
}
