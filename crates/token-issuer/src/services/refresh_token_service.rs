//! Refresh token lifecycle: issue, validate, rotate, revoke.
//!
//! Raw tokens exist only in the `SecretString` handed back from
//! [`RefreshTokenService::generate_and_store`]; the store keeps bcrypt hashes.
//!
//! A record moves Active -> Revoked when it is found expired, when it is
//! rotated, when a newer record is saved for the subject, or on
//! `revoke_all`. Revoked is terminal.

use crate::crypto;
use crate::errors::RefreshTokenError;
use crate::observability::metrics::record_refresh_token_operation;
use crate::repositories::refresh_tokens::{RefreshTokenRecord, RefreshTokenStore};
use chrono::{DateTime, Duration, Utc};
use common::secret::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// A freshly minted refresh token. The raw value is shown to the client once.
#[derive(Debug)]
pub struct IssuedRefreshToken {
    pub raw_token: SecretString,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RefreshTokenService {
    store: Arc<dyn RefreshTokenStore>,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for RefreshTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenService")
            .field("ttl", &self.ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl RefreshTokenService {
    pub fn new(store: Arc<dyn RefreshTokenStore>, ttl_days: i64, bcrypt_cost: u32) -> Self {
        Self {
            store,
            ttl: Duration::days(ttl_days),
            bcrypt_cost,
        }
    }

    /// Mint a refresh token for `subject` and store its hash as the
    /// subject's active record.
    #[instrument(skip_all)]
    pub async fn generate_and_store(
        &self,
        subject: &str,
    ) -> Result<IssuedRefreshToken, RefreshTokenError> {
        let result = self.generate_inner(subject).await;
        record_refresh_token_operation("generate", status_label(&result));
        result
    }

    async fn generate_inner(&self, subject: &str) -> Result<IssuedRefreshToken, RefreshTokenError> {
        let raw_token = crypto::generate_refresh_token()?;
        let token_hash = crypto::hash_refresh_token(raw_token.expose_secret(), self.bcrypt_cost)?;

        let issued_at = Utc::now();
        let expires_at = issued_at + self.ttl;
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            token_hash,
            issued_at,
            expires_at,
            revoked: false,
        };
        let record_id = record.id;

        self.store.save(record).await?;

        tracing::debug!(
            target: "issuer.refresh",
            record_id = %record_id,
            expires_at = %expires_at,
            "Refresh token stored"
        );

        Ok(IssuedRefreshToken {
            raw_token,
            expires_at,
        })
    }

    /// Check a presented token against the subject's active record.
    ///
    /// Rejections (`NotFound`, `Expired`, `HashMismatch`) are `Err`; an
    /// expired record is revoked on the way out.
    #[instrument(skip_all)]
    pub async fn check(
        &self,
        subject: &str,
        raw_token: &str,
    ) -> Result<RefreshTokenRecord, RefreshTokenError> {
        let record = self
            .store
            .find_active_by_subject(subject)
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        if record.is_expired_at(Utc::now()) {
            if self.store.revoke_if_active(record.id).await? {
                record_refresh_token_operation("expire", "success");
            }
            tracing::debug!(
                target: "issuer.refresh",
                record_id = %record.id,
                "Refresh token expired; revoked"
            );
            return Err(RefreshTokenError::Expired);
        }

        if !crypto::verify_refresh_token(raw_token, &record.token_hash)? {
            return Err(RefreshTokenError::HashMismatch);
        }

        Ok(record)
    }

    /// `true` when `raw_token` is the subject's current, unexpired token.
    ///
    /// Store and hashing failures are errors, not `false`.
    #[instrument(skip_all)]
    pub async fn validate(&self, subject: &str, raw_token: &str) -> Result<bool, RefreshTokenError> {
        let outcome = match self.check(subject, raw_token).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_rejection() => {
                tracing::debug!(target: "issuer.refresh", reason = ?e, "Refresh token rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        };

        let status = match &outcome {
            Ok(true) => "success",
            Ok(false) => "rejected",
            Err(_) => "error",
        };
        record_refresh_token_operation("validate", status);
        outcome
    }

    /// Exchange `old_raw_token` for a new one.
    ///
    /// Returns `Ok(None)` on any rejection, including losing a race against a
    /// concurrent rotation of the same token. The old record is revoked with a
    /// conditional update, so only one caller can win.
    #[instrument(skip_all)]
    pub async fn rotate_token(
        &self,
        subject: &str,
        old_raw_token: &str,
    ) -> Result<Option<IssuedRefreshToken>, RefreshTokenError> {
        let outcome = self.rotate_inner(subject, old_raw_token).await;

        let outcome = match outcome {
            Ok(issued) => Ok(Some(issued)),
            Err(e) if e.is_rejection() => {
                tracing::debug!(target: "issuer.refresh", reason = ?e, "Refresh token rotation rejected");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(target: "issuer.refresh", error = %e, "Refresh token rotation failed");
                Err(e)
            }
        };

        let status = match &outcome {
            Ok(Some(_)) => "success",
            Ok(None) => "rejected",
            Err(_) => "error",
        };
        record_refresh_token_operation("rotate", status);
        outcome
    }

    async fn rotate_inner(
        &self,
        subject: &str,
        old_raw_token: &str,
    ) -> Result<IssuedRefreshToken, RefreshTokenError> {
        let record = self.check(subject, old_raw_token).await?;

        if !self.store.revoke_if_active(record.id).await? {
            return Err(RefreshTokenError::Revoked);
        }

        self.generate_inner(subject).await
    }

    /// Revoke every active refresh token for the subject (logout).
    #[instrument(skip_all)]
    pub async fn revoke_all(&self, subject: &str) -> Result<u64, RefreshTokenError> {
        let result = self
            .store
            .revoke_all_for_subject(subject)
            .await
            .map_err(RefreshTokenError::from);

        if let Ok(count) = &result {
            tracing::debug!(target: "issuer.refresh", revoked = count, "Refresh tokens revoked");
        }
        record_refresh_token_operation("revoke_all", status_label(&result));
        result
    }
}

fn status_label<T>(result: &Result<T, RefreshTokenError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) if e.is_rejection() => "rejected",
        Err(_) => "error",
    }
}
