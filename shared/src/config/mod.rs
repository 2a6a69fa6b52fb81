//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT signing secret, issuer/audience and token lifetimes
//! - `cleanup` - Expired token reaper and refresh-token rotation policy
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//!
//! Every loader takes a lookup function so tests can feed values without
//! touching the process environment. `from_env` variants read `std::env`
//! after loading a `.env` file if one is present.

pub mod auth;
pub mod cleanup;
pub mod database;
pub mod environment;

use std::str::FromStr;

use serde::Serialize;

use crate::errors::{ConfigError, ConfigResult};

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cleanup::{CleanupConfig, TokenPolicyConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
///
/// Built once at startup and handed to services by reference.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Expired token reaper configuration
    pub cleanup: CleanupConfig,

    /// Refresh token policy
    pub token_policy: TokenPolicyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Fails when `JWT_SECRET` or `DATABASE_URL` is unset, or when any
    /// numeric setting does not parse.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);
        Ok(Self {
            environment,
            jwt: JwtConfig::from_lookup(&lookup)?,
            database: DatabaseConfig::from_lookup(&lookup)?,
            cleanup: CleanupConfig::from_lookup(&lookup)?,
            token_policy: TokenPolicyConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(environment, &lookup)?,
        })
    }
}

/// Reads `key` and parses it, falling back to `default` when unset or blank
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
        _ => Ok(default),
    }
}

/// Reads `key` as a required, non-blank string
pub(crate) fn required<F>(lookup: &F, key: &str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::missing(key)),
    }
}
