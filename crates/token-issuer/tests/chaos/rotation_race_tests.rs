//! Concurrent refresh token rotation
//!
//! Many tasks present the same refresh token at once. Exactly one may win;
//! the subject must end with a single active record, and it must belong to
//! the winner.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::secret::ExposeSecret;
use futures::future::join_all;
use std::sync::Arc;
use token_issuer::repositories::refresh_tokens::InMemoryRefreshTokenStore;
use token_issuer::services::refresh_token_service::RefreshTokenService;

const TEST_BCRYPT_COST: u32 = 4;
const CONTENDERS: usize = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rotation_has_single_winner() {
    let store = Arc::new(InMemoryRefreshTokenStore::new());
    let service = RefreshTokenService::new(store.clone(), 30, TEST_BCRYPT_COST);

    let issued = service.generate_and_store("42").await.unwrap();
    let raw = issued.raw_token.expose_secret().to_string();

    let handles: Vec<_> = (0..CONTENDERS)
        .map(|_| {
            let service = service.clone();
            let raw = raw.clone();
            tokio::spawn(async move { service.rotate_token("42", &raw).await })
        })
        .collect();

    let winners: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .filter_map(|joined| joined.expect("task should not panic").unwrap())
        .collect();

    assert_eq!(winners.len(), 1, "exactly one rotation must succeed");
    assert_eq!(store.active_count("42").await, 1);

    let winner = winners.first().unwrap();
    assert!(service
        .validate("42", winner.raw_token.expose_secret())
        .await
        .unwrap());
    assert!(!service.validate("42", &raw).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rotation_chains_stay_consistent_across_subjects() {
    let store = Arc::new(InMemoryRefreshTokenStore::new());
    let service = RefreshTokenService::new(store.clone(), 30, TEST_BCRYPT_COST);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let subject = format!("user-{i}");
                let mut current = service.generate_and_store(&subject).await.unwrap();
                for _ in 0..3 {
                    current = service
                        .rotate_token(&subject, current.raw_token.expose_secret())
                        .await
                        .unwrap()
                        .expect("sequential rotation should succeed");
                }
                subject
            })
        })
        .collect();

    for joined in join_all(handles).await {
        let subject = joined.expect("task should not panic");
        assert_eq!(store.active_count(&subject).await, 1);
        assert_eq!(store.records_for_subject(&subject).await.len(), 4);
    }
}
