use crate::errors::{IssuerError, SigningError};
use crate::models::{Principal, TokenResponse, TOKEN_TYPE_BEARER};
use crate::services::refresh_token_service::{IssuedRefreshToken, RefreshTokenService};
use crate::services::token_issuer::TokenIssuer;
use common::secret::ExposeSecret;
use tracing::instrument;

/// Login, refresh and logout over the access and refresh token services.
#[derive(Debug, Clone)]
pub struct TokenPairService {
    access: TokenIssuer,
    refresh: RefreshTokenService,
}

impl TokenPairService {
    pub fn new(access: TokenIssuer, refresh: RefreshTokenService) -> Self {
        Self { access, refresh }
    }

    /// Issue a fresh token pair for a principal that just authenticated.
    #[instrument(skip_all)]
    pub async fn issue_pair(&self, principal: &Principal) -> Result<TokenResponse, IssuerError> {
        let issued = self.refresh.generate_and_store(&principal.subject).await?;
        self.respond(principal, issued)
    }

    /// Rotate the refresh token and mint a new access token.
    ///
    /// `Ok(None)` means the presented refresh token was rejected.
    #[instrument(skip_all)]
    pub async fn refresh(
        &self,
        principal: &Principal,
        raw_refresh_token: &str,
    ) -> Result<Option<TokenResponse>, IssuerError> {
        match self
            .refresh
            .rotate_token(&principal.subject, raw_refresh_token)
            .await?
        {
            Some(issued) => self.respond(principal, issued).map(Some),
            None => Ok(None),
        }
    }

    /// Revoke every refresh token held by the subject.
    #[instrument(skip_all)]
    pub async fn logout(&self, subject: &str) -> Result<u64, IssuerError> {
        Ok(self.refresh.revoke_all(subject).await?)
    }

    fn respond(
        &self,
        principal: &Principal,
        issued: IssuedRefreshToken,
    ) -> Result<TokenResponse, IssuerError> {
        let access_token = self.access.issue_access_token(
            &principal.subject,
            &principal.username,
            &principal.role,
        )?;

        let expires_in = u64::try_from(self.access.ttl_seconds()).map_err(|_| {
            SigningError::Claims(format!(
                "access token TTL is not positive: {}s",
                self.access.ttl_seconds()
            ))
        })?;

        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
            refresh_token: issued.raw_token.expose_secret().to_string(),
            refresh_expires_at: issued.expires_at,
        })
    }
}
