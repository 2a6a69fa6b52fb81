//! Authentication configuration: JWT signing secret, issuer/audience and lifetimes

use serde::{Serialize, Serializer};

use super::{parse_or, required};
use crate::errors::{ConfigError, ConfigResult};

/// Default JWT issuer claim
pub const DEFAULT_ISSUER: &str = "sessionguard";

/// Default JWT audience claim
pub const DEFAULT_AUDIENCE: &str = "sessionguard-api";

/// Default access token lifetime
pub const DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Default refresh token lifetime
pub const DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Longest accepted access token lifetime (one day)
pub const MAX_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 24 * 60;

/// Longest accepted refresh token lifetime (one year)
pub const MAX_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 366;

/// JWT authentication configuration
///
/// There is intentionally no `Default` implementation: the signing secret
/// has to come from the deployment.
#[derive(Clone, Serialize)]
pub struct JwtConfig {
    /// Symmetric secret used for HMAC-SHA256 signing
    #[serde(serialize_with = "redact")]
    pub secret: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Access token lifetime in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_expiry_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_expiry_minutes", &self.access_token_expiry_minutes)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .finish()
    }
}

impl JwtConfig {
    /// Create a JWT configuration with the given secret and default policy values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when the secret is empty.
    pub fn new(secret: impl Into<String>) -> ConfigResult<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::missing("JWT_SECRET"));
        }
        Ok(Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            access_token_expiry_minutes: DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES,
            refresh_token_expiry_days: DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Create through a key lookup
    ///
    /// Reads `JWT_SECRET` (required), `JWT_ISSUER`, `JWT_AUDIENCE`,
    /// `JWT_ACCESS_TOKEN_EXPIRY_MINUTES` and `JWT_REFRESH_TOKEN_EXPIRY_DAYS`.
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = required(lookup, "JWT_SECRET")?;
        let issuer = lookup("JWT_ISSUER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        let audience = lookup("JWT_AUDIENCE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());
        let access_token_expiry_minutes = parse_or(
            lookup,
            "JWT_ACCESS_TOKEN_EXPIRY_MINUTES",
            DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES,
        )?;
        let refresh_token_expiry_days = parse_or(
            lookup,
            "JWT_REFRESH_TOKEN_EXPIRY_DAYS",
            DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS,
        )?;

        let config = Self {
            secret,
            issuer,
            audience,
            access_token_expiry_minutes,
            refresh_token_expiry_days,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry_minutes = minutes;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry_days = days;
        self
    }

    /// Set issuer and audience claims
    pub fn with_issuer_audience(mut self, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self.audience = audience.into();
        self
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes.saturating_mul(60)
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.refresh_token_expiry_days.saturating_mul(86_400)
    }

    /// Check both lifetimes against their bounds
    ///
    /// Builders and struct literals skip this; consumers call it before
    /// turning the lifetimes into durations.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range(
            "JWT_ACCESS_TOKEN_EXPIRY_MINUTES",
            self.access_token_expiry_minutes,
            MAX_ACCESS_TOKEN_EXPIRY_MINUTES,
        )?;
        check_range(
            "JWT_REFRESH_TOKEN_EXPIRY_DAYS",
            self.refresh_token_expiry_days,
            MAX_REFRESH_TOKEN_EXPIRY_DAYS,
        )
    }
}

fn check_range(key: &str, value: i64, max: i64) -> ConfigResult<()> {
    if value <= 0 {
        return Err(ConfigError::invalid(key, "must be greater than zero"));
    }
    if value > max {
        return Err(ConfigError::invalid(key, format!("must not exceed {}", max)));
    }
    Ok(())
}

fn redact<S: Serializer>(_: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("<redacted>")
}
