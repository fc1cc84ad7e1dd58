//! Token verifier configuration.
//!
//! Configuration is loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default JWKS cache lifetime in minutes.
pub const DEFAULT_JWKS_CACHE_TTL_MINUTES: u64 = 60;

/// Upper bound for the JWKS cache lifetime (one day).
pub const MAX_JWKS_CACHE_TTL_MINUTES: u64 = 1440;

/// Default JWKS fetch timeout in seconds.
pub const DEFAULT_JWKS_FETCH_TIMEOUT_SECONDS: u64 = 10;

/// Upper bound for the JWKS fetch timeout.
pub const MAX_JWKS_FETCH_TIMEOUT_SECONDS: u64 = 60;

/// Token verifier configuration.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// URL of the issuer's JWKS document.
    pub jwks_uri: String,

    /// Exact `iss` value accepted on tokens.
    pub expected_issuer: String,

    /// How long a fetched key set is trusted.
    pub jwks_cache_ttl: Duration,

    /// Timeout for one JWKS HTTP request.
    pub jwks_fetch_timeout: Duration,

    /// When false, bearer authentication is skipped entirely.
    pub auth_enabled: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidCacheTtl(String),

    #[error("Invalid JWKS fetch timeout configuration: {0}")]
    InvalidFetchTimeout(String),

    #[error("Invalid AUTH_ENABLED value: {0}")]
    InvalidAuthEnabled(String),
}

impl VerifierConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let jwks_uri = vars
            .get("JWKS_URI")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWKS_URI".to_string()))?
            .clone();

        let expected_issuer = vars
            .get("EXPECTED_ISSUER")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("EXPECTED_ISSUER".to_string()))?
            .clone();

        let cache_ttl_minutes = if let Some(value_str) = vars.get("JWKS_CACHE_TTL_MINUTES") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidCacheTtl(format!(
                    "JWKS_CACHE_TTL_MINUTES must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 || value > MAX_JWKS_CACHE_TTL_MINUTES {
                return Err(ConfigError::InvalidCacheTtl(format!(
                    "JWKS_CACHE_TTL_MINUTES must be between 1 and {}, got {}",
                    MAX_JWKS_CACHE_TTL_MINUTES, value
                )));
            }

            value
        } else {
            DEFAULT_JWKS_CACHE_TTL_MINUTES
        };

        let fetch_timeout_seconds =
            if let Some(value_str) = vars.get("JWKS_FETCH_TIMEOUT_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidFetchTimeout(format!(
                        "JWKS_FETCH_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 || value > MAX_JWKS_FETCH_TIMEOUT_SECONDS {
                    return Err(ConfigError::InvalidFetchTimeout(format!(
                        "JWKS_FETCH_TIMEOUT_SECONDS must be between 1 and {}, got {}",
                        MAX_JWKS_FETCH_TIMEOUT_SECONDS, value
                    )));
                }

                value
            } else {
                DEFAULT_JWKS_FETCH_TIMEOUT_SECONDS
            };

        let auth_enabled = match vars.get("AUTH_ENABLED").map(|v| v.trim().to_ascii_lowercase()) {
            None => true,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(v) => return Err(ConfigError::InvalidAuthEnabled(v)),
        };

        let cache_ttl_seconds = cache_ttl_minutes.checked_mul(60).ok_or_else(|| {
            ConfigError::InvalidCacheTtl(format!(
                "JWKS_CACHE_TTL_MINUTES is out of range, got {}",
                cache_ttl_minutes
            ))
        })?;

        Ok(VerifierConfig {
            jwks_uri,
            expected_issuer,
            jwks_cache_ttl: Duration::from_secs(cache_ttl_seconds),
            jwks_fetch_timeout: Duration::from_secs(fetch_timeout_seconds),
            auth_enabled,
        })
    }
}
