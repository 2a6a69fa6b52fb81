//! Expired token reaper and refresh token policy configuration

use serde::{Deserialize, Serialize};

use super::parse_or;
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the expired token reaper
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl CleanupConfig {
    /// Create through a key lookup
    ///
    /// Reads `TOKEN_CLEANUP_INTERVAL_SECONDS` and `TOKEN_CLEANUP_ENABLED`.
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let interval_seconds =
            parse_or(lookup, "TOKEN_CLEANUP_INTERVAL_SECONDS", defaults.interval_seconds)?;
        if interval_seconds == 0 {
            return Err(ConfigError::invalid(
                "TOKEN_CLEANUP_INTERVAL_SECONDS",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            interval_seconds,
            enabled: parse_or(lookup, "TOKEN_CLEANUP_ENABLED", defaults.enabled)?,
        })
    }
}

/// Refresh token handling policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPolicyConfig {
    /// Revoke the presented refresh token when it is exchanged for a new pair
    ///
    /// When disabled, a refresh token stays usable until it expires or is
    /// revoked explicitly, and one token may mint several pairs.
    pub rotate_refresh_tokens: bool,
}

impl Default for TokenPolicyConfig {
    fn default() -> Self {
        Self {
            rotate_refresh_tokens: true,
        }
    }
}

impl TokenPolicyConfig {
    /// Create through a key lookup (`REFRESH_TOKEN_ROTATION`)
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            rotate_refresh_tokens: parse_or(
                lookup,
                "REFRESH_TOKEN_ROTATION",
                Self::default().rotate_refresh_tokens,
            )?,
        })
    }
}
