//! Bearer authentication for resource servers.
//!
//! Takes the raw `Authorization` header value, extracts a Bearer token and
//! verifies it with the [`JwtValidator`]. The transport is left to the
//! embedding server: it passes the header in and maps the outcome to its own
//! request context and response type.
//!
//! # Outcomes
//!
//! - `Ok(None)` - no authentication attempt (no header, another scheme, or
//!   authentication disabled). The server's access policy decides.
//! - `Ok(Some(identity))` - the token verified.
//! - `Err(_)` - a Bearer token was presented and rejected. Respond with
//!   [`AuthenticationFailure`].

use crate::auth::{Identity, JwksClient, JwtValidator};
use crate::config::VerifierConfig;
use crate::errors::{JwksFetchError, TokenValidationError};
use common::jwt::extract_bearer_token;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Body sent with every authentication rejection.
pub const AUTHENTICATION_FAILURE_MESSAGE: &str = "Invalid or expired token";

/// Verifies Bearer credentials when authentication is enabled.
#[derive(Clone)]
pub struct BearerAuthenticator {
    validator: Arc<JwtValidator>,
    enabled: bool,
}

impl BearerAuthenticator {
    pub fn new(validator: Arc<JwtValidator>, enabled: bool) -> Self {
        Self { validator, enabled }
    }

    /// Wire up the JWKS client, validator and switch from configuration.
    ///
    /// # Errors
    ///
    /// Returns `JwksFetchError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, JwksFetchError> {
        let jwks_client = Arc::new(JwksClient::from_config(config)?);
        let validator = Arc::new(JwtValidator::new(
            jwks_client,
            config.expected_issuer.clone(),
        ));
        Ok(Self::new(validator, config.auth_enabled))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Authenticate a request from its `Authorization` header value.
    #[instrument(skip_all, name = "verifier.auth")]
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<Identity>, TokenValidationError> {
        if !self.enabled {
            return Ok(None);
        }

        let Some(token) = extract_bearer_token(authorization) else {
            tracing::debug!(target: "verifier.auth", "No Bearer token presented");
            return Ok(None);
        };

        match self.validator.verify(token).await {
            Ok(identity) => {
                tracing::debug!(
                    target: "verifier.auth",
                    authorities = ?identity.authorities,
                    "Request authenticated"
                );
                Ok(Some(identity))
            }
            Err(e) => {
                tracing::debug!(
                    target: "verifier.auth",
                    error_category = e.category(),
                    "Bearer token rejected"
                );
                Err(e)
            }
        }
    }
}

/// Client-facing rejection. Carries no detail about which check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticationFailure {
    error: &'static str,
}

impl AuthenticationFailure {
    /// HTTP status for a rejected credential.
    pub const STATUS_CODE: u16 = 401;

    /// `WWW-Authenticate` challenge to send with the rejection.
    pub const WWW_AUTHENTICATE: &'static str = "Bearer";

    pub fn new() -> Self {
        Self {
            error: AUTHENTICATION_FAILURE_MESSAGE,
        }
    }

    /// JSON response body.
    pub fn body(&self) -> String {
        serde_json::json!({ "error": self.error }).to_string()
    }
}

impl Default for AuthenticationFailure {
    fn default() -> Self {
        Self::new()
    }
}

impl From<TokenValidationError> for AuthenticationFailure {
    fn from(_: TokenValidationError) -> Self {
        Self::new()
    }
}
