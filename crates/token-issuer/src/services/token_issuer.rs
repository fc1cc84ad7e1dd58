use crate::config::MAX_ACCESS_TOKEN_TTL_MINUTES;
use crate::crypto::{self, AccessClaims};
use crate::errors::SigningError;
use crate::keys::KeyManager;
use crate::observability::metrics::record_access_token_issued;
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// Mints RS256 access tokens with the process signing key.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyManager>,
    issuer: String,
    ttl_minutes: i64,
}

impl TokenIssuer {
    /// # Errors
    ///
    /// Returns `SigningError::Claims` unless `ttl_minutes` is between 1 and
    /// `MAX_ACCESS_TOKEN_TTL_MINUTES`.
    pub fn new(
        keys: Arc<KeyManager>,
        issuer: impl Into<String>,
        ttl_minutes: i64,
    ) -> Result<Self, SigningError> {
        if !(1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(SigningError::Claims(format!(
                "access token TTL must be between 1 and {} minutes, got {}",
                MAX_ACCESS_TOKEN_TTL_MINUTES, ttl_minutes
            )));
        }

        Ok(Self {
            keys,
            issuer: issuer.into(),
            ttl_minutes,
        })
    }

    /// Access token lifetime in seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_minutes * 60
    }

    /// Issue a signed access token for an authenticated principal.
    ///
    /// The role is upper-cased into the `roles` claim.
    #[instrument(skip_all)]
    pub fn issue_access_token(
        &self,
        subject: &str,
        username: &str,
        role: &str,
    ) -> Result<String, SigningError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: subject.to_string(),
            username: username.to_string(),
            roles: role.to_uppercase(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_seconds(),
        };

        match crypto::sign_jwt(&claims, self.keys.encoding_key(), self.keys.key_id()) {
            Ok(token) => {
                tracing::debug!(
                    target: "issuer.tokens",
                    kid = %self.keys.key_id(),
                    expires_in = self.ttl_seconds(),
                    "Access token issued"
                );
                record_access_token_issued("success");
                Ok(token)
            }
            Err(e) => {
                tracing::error!(target: "issuer.tokens", error = %e, "Access token signing failed");
                record_access_token_issued("error");
                Err(e)
            }
        }
    }
}
