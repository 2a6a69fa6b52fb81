//! Shared configuration for SessionGuard
//!
//! This crate provides the configuration surface used across all server modules:
//! - JWT signing and token lifetime settings
//! - Database connection pool settings
//! - Environment detection and logging configuration
//! - Background cleanup and refresh-token policy settings

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CleanupConfig, DatabaseConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    TokenPolicyConfig,
};
pub use errors::{ConfigError, ConfigResult};
