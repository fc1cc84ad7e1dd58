//! Access token claims and the identity derived from them.
//!
//! The `sub` and `username` fields are redacted in Debug output to prevent
//! exposure in logs.

use common::jwt::role_authority;
use serde::Deserialize;
use std::fmt;

/// Claims carried by a verified access token.
#[derive(Clone, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID) - redacted in Debug output.
    pub sub: String,

    /// Login name - redacted in Debug output.
    #[serde(default)]
    pub username: Option<String>,

    /// Single role name, e.g. `USER`.
    #[serde(default)]
    pub roles: Option<String>,

    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(default)]
    pub iat: Option<i64>,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for AccessTokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenClaims")
            .field("sub", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("iss", &self.iss)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// The authenticated principal produced by a successful verification.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub username: Option<String>,

    /// `ROLE_`-prefixed authorities. Empty when the token carries no role.
    pub authorities: Vec<String>,
}

impl Identity {
    /// Check if the identity holds an authority, e.g. `ROLE_ADMIN`.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl From<AccessTokenClaims> for Identity {
    fn from(claims: AccessTokenClaims) -> Self {
        let authorities = claims
            .roles
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(role_authority)
            .into_iter()
            .collect();

        Self {
            subject: claims.sub,
            username: claims.username,
            authorities,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .field("authorities", &self.authorities)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn claims(roles: Option<&str>) -> AccessTokenClaims {
        AccessTokenClaims {
            sub: "42".to_string(),
            username: Some("alice".to_string()),
            roles: roles.map(str::to_string),
            iss: Some("https://issuer.example".to_string()),
            iat: Some(1_700_000_000),
            exp: 1_700_000_900,
        }
    }

    #[test]
    fn test_identity_from_claims_prefixes_role() {
        let identity = Identity::from(claims(Some("USER")));

        assert_eq!(identity.subject, "42");
        assert_eq!(identity.username.as_deref(), Some("alice"));
        assert_eq!(identity.authorities, vec!["ROLE_USER".to_string()]);
        assert!(identity.has_authority("ROLE_USER"));
        assert!(!identity.has_authority("ROLE_ADMIN"));
    }

    #[test]
    fn test_absent_role_yields_no_authorities() {
        assert!(Identity::from(claims(None)).authorities.is_empty());
        assert!(Identity::from(claims(Some(""))).authorities.is_empty());
    }

    #[test]
    fn test_claims_deserialize_with_optional_fields_missing() {
        let parsed: AccessTokenClaims =
            serde_json::from_str(r#"{"sub":"7","exp":1700000000}"#).unwrap();

        assert_eq!(parsed.sub, "7");
        assert!(parsed.username.is_none());
        assert!(parsed.roles.is_none());
        assert!(parsed.iss.is_none());
    }

    #[test]
    fn test_debug_redacts_personal_fields() {
        let claims_debug = format!("{:?}", claims(Some("USER")));
        let identity_debug = format!("{:?}", Identity::from(claims(Some("USER"))));

        for debug in [claims_debug, identity_debug] {
            assert!(debug.contains("[REDACTED]"));
            assert!(!debug.contains("alice"));
            assert!(!debug.contains("\"42\""));
        }
    }
}
