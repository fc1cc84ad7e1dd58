//! Refresh token persistence.
//!
//! Implementations must make `save` and `revoke_if_active` atomic: the
//! rotation flow relies on them to keep at most one active record per
//! subject under concurrent requests.

use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Stored refresh token. Holds the bcrypt hash, never the raw token.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub subject: String,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshTokenRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("id", &self.id)
            .field("subject", &"[REDACTED]")
            .field("token_hash", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("revoked", &self.revoked)
            .finish()
    }
}

/// Storage contract for refresh tokens.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist `record` as the subject's active token, revoking any other
    /// active record for the same subject in the same critical section.
    async fn save(&self, record: RefreshTokenRecord) -> Result<(), StoreError>;

    /// The subject's non-revoked record, if any.
    async fn find_active_by_subject(
        &self,
        subject: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Revoke a record only if it is still active.
    ///
    /// Returns `true` when this call performed the transition.
    async fn revoke_if_active(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Revoke every active record for the subject. Returns the count revoked.
    async fn revoke_all_for_subject(&self, subject: &str) -> Result<u64, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, StoreError>;
}

/// Process-local store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<HashMap<Uuid, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-revoked records for a subject.
    pub async fn active_count(&self, subject: &str) -> usize {
        self.records
            .lock()
            .await
            .values()
            .filter(|r| r.subject == subject && !r.revoked)
            .count()
    }

    /// Every record for a subject, active or not.
    pub async fn records_for_subject(&self, subject: &str) -> Vec<RefreshTokenRecord> {
        self.records
            .lock()
            .await
            .values()
            .filter(|r| r.subject == subject)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn save(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;

        for existing in records.values_mut() {
            if existing.subject == record.subject && !existing.revoked && existing.id != record.id
            {
                existing.revoked = true;
            }
        }

        records.insert(record.id, record);
        Ok(())
    }

    async fn find_active_by_subject(
        &self,
        subject: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records
            .values()
            .filter(|r| r.subject == subject && !r.revoked)
            .max_by_key(|r| r.issued_at)
            .cloned())
    }

    async fn revoke_if_active(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        match records.get_mut(&id) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_subject(&self, subject: &str) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        let mut revoked = 0;
        for record in records.values_mut() {
            if record.subject == subject && !record.revoked {
                record.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.records.lock().await.get(&id).cloned())
    }
}
