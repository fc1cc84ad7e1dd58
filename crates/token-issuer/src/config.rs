use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default access token lifetime (minutes).
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Upper bound for the access token lifetime (one day).
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 1440;

/// Default refresh token lifetime (days).
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Upper bound for the refresh token lifetime.
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

/// Default bcrypt cost for refresh token hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost from configuration.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost from configuration.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Where the signing key comes from.
///
/// Inline content is either PEM text or base64 of PEM text; it is held as a
/// secret because an unencrypted key is the key.
#[derive(Debug, Clone)]
pub enum KeySource {
    Inline(SecretString),
    Path(PathBuf),
}

/// Signing key settings consumed by `KeyManager::load`.
#[derive(Debug, Clone)]
pub struct KeySourceConfig {
    pub source: KeySource,
    pub passphrase: Option<SecretString>,
    pub key_id: String,
}

#[derive(Debug, Clone)]
pub struct IssuerConfig {
    pub key: KeySourceConfig,
    pub issuer: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl IssuerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        // Inline content wins over a path when both are set
        let source = match (
            non_blank(vars, "SIGNING_KEY_CONTENT"),
            non_blank(vars, "SIGNING_KEY_PATH"),
        ) {
            (Some(content), _) => KeySource::Inline(SecretString::from(content.to_string())),
            (None, Some(path)) => KeySource::Path(PathBuf::from(path)),
            (None, None) => {
                return Err(ConfigError::MissingEnvVar(
                    "SIGNING_KEY_CONTENT or SIGNING_KEY_PATH".to_string(),
                ))
            }
        };

        let passphrase = vars
            .get("SIGNING_KEY_PASSPHRASE")
            .map(|p| SecretString::from(p.clone()));

        let key_id = non_blank(vars, "SIGNING_KEY_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("SIGNING_KEY_ID".to_string()))?
            .to_string();

        let issuer = non_blank(vars, "TOKEN_ISSUER")
            .ok_or_else(|| ConfigError::MissingEnvVar("TOKEN_ISSUER".to_string()))?
            .to_string();

        let access_token_ttl_minutes = parse_bounded(
            vars,
            "ACCESS_TOKEN_TTL_MINUTES",
            DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
            1..=MAX_ACCESS_TOKEN_TTL_MINUTES,
        )?;

        let refresh_token_ttl_days = parse_bounded(
            vars,
            "REFRESH_TOKEN_TTL_DAYS",
            DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            1..=MAX_REFRESH_TOKEN_TTL_DAYS,
        )?;

        let bcrypt_cost = parse_bounded(
            vars,
            "REFRESH_TOKEN_BCRYPT_COST",
            DEFAULT_BCRYPT_COST,
            MIN_BCRYPT_COST..=MAX_BCRYPT_COST,
        )?;

        Ok(IssuerConfig {
            key: KeySourceConfig {
                source,
                passphrase,
                key_id,
            },
            issuer,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            bcrypt_cost,
        })
    }
}

fn non_blank<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_bounded<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
    range: std::ops::RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };

    let value: T = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("'{}' is not a number", raw),
    })?;

    if !range.contains(&value) {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!(
                "{} is outside {}..={}",
                value,
                range.start(),
                range.end()
            ),
        });
    }

    Ok(value)
}
