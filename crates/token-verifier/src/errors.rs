//! Token verifier error types.
//!
//! Every token rejection displays the same generic message so a caller
//! cannot use the verifier as an oracle. The specific reason is logged at
//! debug level and exposed through [`TokenValidationError::category`] for
//! metrics.

use thiserror::Error;

/// Generic rejection text shared by every validation failure.
pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// Failure to obtain a key set from the issuer.
#[derive(Debug, Error)]
pub enum JwksFetchError {
    #[error("JWKS request failed: {0}")]
    Transport(String),

    #[error("JWKS endpoint returned status {0}")]
    Status(u16),

    #[error("JWKS response could not be parsed: {0}")]
    Parse(String),
}

/// Key lookup failure.
#[derive(Debug, Error)]
pub enum JwksError {
    /// The current key set has no key with this ID.
    #[error("Signing key not found")]
    NotFound,

    #[error(transparent)]
    Fetch(#[from] JwksFetchError),
}

/// Access token rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenValidationError {
    #[error("The access token is invalid or expired")]
    Malformed,

    #[error("The access token is invalid or expired")]
    UnknownKeyId,

    #[error("The access token is invalid or expired")]
    SignatureMismatch,

    #[error("The access token is invalid or expired")]
    IssuerMismatch,

    #[error("The access token is invalid or expired")]
    Expired,

    #[error("The access token is invalid or expired")]
    KeySetUnavailable,
}

impl TokenValidationError {
    /// Bounded label for metrics and logs.
    pub fn category(&self) -> &'static str {
        match self {
            TokenValidationError::Malformed => "malformed",
            TokenValidationError::UnknownKeyId => "unknown_key_id",
            TokenValidationError::SignatureMismatch => "signature_mismatch",
            TokenValidationError::IssuerMismatch => "issuer_mismatch",
            TokenValidationError::Expired => "expired",
            TokenValidationError::KeySetUnavailable => "key_set_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_share_message() {
        let all = [
            TokenValidationError::Malformed,
            TokenValidationError::UnknownKeyId,
            TokenValidationError::SignatureMismatch,
            TokenValidationError::IssuerMismatch,
            TokenValidationError::Expired,
            TokenValidationError::KeySetUnavailable,
        ];

        for err in all {
            assert_eq!(err.to_string(), INVALID_TOKEN_MESSAGE);
        }

        let mut categories: Vec<_> = all.iter().map(TokenValidationError::category).collect();
        categories.sort_unstable();
        categories.dedup();
        assert_eq!(categories.len(), all.len());
    }

    #[test]
    fn test_fetch_error_converts() {
        let err = JwksError::from(JwksFetchError::Status(503));
        assert!(matches!(err, JwksError::Fetch(JwksFetchError::Status(503))));
        assert_eq!(err.to_string(), "JWKS endpoint returned status 503");
    }
}
