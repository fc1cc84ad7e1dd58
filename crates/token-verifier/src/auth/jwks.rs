//! JWKS client for fetching and caching the issuer's public keys.
//!
//! The client fetches the key set from the issuer's `/.well-known/jwks.json`
//! endpoint and caches the whole document with a configurable TTL.
//!
//! # Concurrency
//!
//! Lookups take the read lock. On a miss or an expired entry the client takes
//! the write lock, re-checks, and fetches while still holding it, so any number
//! of concurrent misses produce a single HTTP request.
//!
//! # Failure
//!
//! A failed fetch leaves the cached entry as it was and the error propagates
//! to the caller. An expired entry is never served.

use crate::config::{VerifierConfig, MAX_JWKS_CACHE_TTL_MINUTES};
use crate::errors::{JwksError, JwksFetchError};
use crate::observability::metrics::record_jwks_fetch;
use common::jwks::{Jwk, Jwks};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// Cached key set with expiry time.
struct CachedJwks {
    jwks: Jwks,

    /// When this cache entry expires.
    expires_at: Instant,
}

impl CachedJwks {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }

    fn lookup(&self, kid: &str) -> Result<Jwk, JwksError> {
        self.jwks.find(kid).cloned().ok_or_else(|| {
            tracing::debug!(target: "verifier.jwks", kid = %kid, "Key not found in JWKS");
            JwksError::NotFound
        })
    }
}

/// JWKS client for fetching and caching public keys.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,

    /// Cached key set.
    cache: RwLock<Option<CachedJwks>>,

    /// Cache TTL duration.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a new JWKS client.
    ///
    /// # Arguments
    ///
    /// * `jwks_url` - URL to the issuer's JWKS endpoint
    /// * `cache_ttl` - How long a fetched key set is served before refetching,
    ///   capped at `MAX_JWKS_CACHE_TTL_MINUTES`
    /// * `fetch_timeout` - Upper bound on a single HTTP request
    ///
    /// # Errors
    ///
    /// Returns `JwksFetchError::Transport` if the HTTP client cannot be built.
    pub fn new(
        jwks_url: String,
        cache_ttl: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, JwksFetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| {
                tracing::error!(target: "verifier.jwks", error = %e, "Failed to build HTTP client");
                JwksFetchError::Transport(e.to_string())
            })?;

        let max_ttl = Duration::from_secs(MAX_JWKS_CACHE_TTL_MINUTES * 60);
        if cache_ttl > max_ttl {
            tracing::warn!(
                target: "verifier.jwks",
                requested_secs = cache_ttl.as_secs(),
                max_secs = max_ttl.as_secs(),
                "JWKS cache TTL capped"
            );
        }

        Ok(Self {
            jwks_url,
            http_client,
            cache: RwLock::new(None),
            cache_ttl: cache_ttl.min(max_ttl),
        })
    }

    /// Create a client from verifier configuration.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, JwksFetchError> {
        Self::new(
            config.jwks_uri.clone(),
            config.jwks_cache_ttl,
            config.jwks_fetch_timeout,
        )
    }

    /// Get a public key by key ID.
    ///
    /// Serves from the cache while it is fresh, otherwise fetches the key set.
    ///
    /// # Errors
    ///
    /// - `JwksError::NotFound` - the current key set has no key with this ID
    /// - `JwksError::Fetch` - the key set could not be obtained
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_public_key(&self, kid: &str) -> Result<Jwk, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
                tracing::debug!(target: "verifier.jwks", kid = %kid, "JWKS cache hit");
                return cached.lookup(kid);
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited for the write lock.
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
            return cached.lookup(kid);
        }

        let jwks = self.fetch().await?;
        let refreshed = CachedJwks {
            jwks,
            expires_at: expiry_after(self.cache_ttl),
        };
        let result = refreshed.lookup(kid);
        *cache = Some(refreshed);

        result
    }

    /// Expire the cached key set so the next lookup fetches again.
    ///
    /// The stale document stays in place until a fetch succeeds.
    pub async fn refresh_cache(&self) {
        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_mut() {
            cached.expires_at = Instant::now();
        }
        tracing::debug!(target: "verifier.jwks", "JWKS cache marked stale");
    }

    /// Fetch the key set from the issuer.
    async fn fetch(&self) -> Result<Jwks, JwksFetchError> {
        tracing::debug!(target: "verifier.jwks", url = %self.jwks_url, "Fetching JWKS");

        let result = self.fetch_inner().await;
        match &result {
            Ok(jwks) => {
                record_jwks_fetch("success");
                tracing::info!(
                    target: "verifier.jwks",
                    key_count = jwks.keys.len(),
                    "JWKS cache refreshed"
                );
            }
            Err(e) => {
                record_jwks_fetch("error");
                tracing::error!(target: "verifier.jwks", error = %e, "Failed to fetch JWKS");
            }
        }
        result
    }

    async fn fetch_inner(&self) -> Result<Jwks, JwksFetchError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksFetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JwksFetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| JwksFetchError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| JwksFetchError::Parse(e.to_string()))
    }
}

/// Instant a key set fetched now stops being fresh. An unrepresentable
/// instant leaves the entry already stale.
fn expiry_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl).unwrap_or(now)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_jwks_client_creation() {
        let client = JwksClient::new(
            "http://localhost:8082/.well-known/jwks.json".to_string(),
            Duration::from_secs(60),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.jwks_url,
            "http://localhost:8082/.well-known/jwks.json"
        );
        assert_eq!(client.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_cache_ttl_is_capped() {
        let client = JwksClient::new(
            "http://localhost:8082/.well-known/jwks.json".to_string(),
            Duration::MAX,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.cache_ttl, Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn test_expiry_after_unrepresentable_ttl_is_stale() {
        let before = Instant::now();
        let expiry = expiry_after(Duration::MAX);
        assert!(expiry >= before);
        assert!(expiry <= Instant::now());
    }

    #[test]
    fn test_from_config_uses_configured_values() {
        let vars = HashMap::from([
            ("JWKS_URI".to_string(), "http://localhost:1/jwks".to_string()),
            (
                "EXPECTED_ISSUER".to_string(),
                "https://issuer.example".to_string(),
            ),
            ("JWKS_CACHE_TTL_MINUTES".to_string(), "2".to_string()),
        ]);
        let config = VerifierConfig::from_vars(&vars).unwrap();

        let client = JwksClient::from_config(&config).unwrap();
        assert_eq!(client.jwks_url, "http://localhost:1/jwks");
        assert_eq!(client.cache_ttl, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is not expected to serve HTTP.
        let client = JwksClient::new(
            "http://127.0.0.1:9/.well-known/jwks.json".to_string(),
            Duration::from_secs(60),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.get_public_key("k1").await.unwrap_err();
        assert!(matches!(
            err,
            JwksError::Fetch(JwksFetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_cache_on_empty_cache_is_noop() {
        let client = JwksClient::new(
            "http://127.0.0.1:9/.well-known/jwks.json".to_string(),
            Duration::from_secs(60),
            Duration::from_secs(1),
        )
        .unwrap();

        client.refresh_cache().await;
        assert!(client.cache.read().await.is_none());
    }
}
