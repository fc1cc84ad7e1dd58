use thiserror::Error;

/// Errors raised while turning configured key material into a signing key.
///
/// Every variant is fatal at startup. Messages name the failing stage only;
/// key bytes and passphrases never appear.
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("Failed to read signing key: {0}")]
    Io(#[from] std::io::Error),

    #[error("Signing key content is not valid PEM: {0}")]
    Pem(String),

    #[error("Unsupported key format: {0}")]
    UnsupportedKeyFormat(String),

    #[error("Unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported PEM cipher: {0}")]
    UnsupportedCipher(String),

    #[error("Encrypted signing key requires a passphrase")]
    MissingPassphrase,

    #[error("Failed to decrypt signing key")]
    Decrypt,

    #[error("Signing key is not a valid RSA private key: {0}")]
    InvalidKey(String),

    #[error("Signing key is missing CRT parameters")]
    MissingCrtParameters,
}

/// Access token signing failure. Internal to the request that hit it.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Failed to sign access token: {0}")]
    Jwt(String),

    #[error("Invalid token claims: {0}")]
    Claims(String),
}

/// Refresh token store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Refresh token store unavailable: {0}")]
    Unavailable(String),
}

/// Refresh token lifecycle errors.
///
/// Rejections share one display so a caller cannot tell which check failed.
#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("The refresh token is invalid or expired")]
    NotFound,

    #[error("The refresh token is invalid or expired")]
    Revoked,

    #[error("The refresh token is invalid or expired")]
    Expired,

    #[error("The refresh token is invalid or expired")]
    HashMismatch,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to hash refresh token: {0}")]
    Hashing(String),

    #[error("Failed to generate random bytes")]
    Random,
}

impl RefreshTokenError {
    /// True for the variants that reject a presented token.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RefreshTokenError::NotFound
                | RefreshTokenError::Revoked
                | RefreshTokenError::Expired
                | RefreshTokenError::HashMismatch
        )
    }
}

/// Errors from the token pair flow.
#[derive(Debug, Error)]
pub enum IssuerError {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    RefreshToken(#[from] RefreshTokenError),
}
