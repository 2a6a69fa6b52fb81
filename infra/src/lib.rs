//! # Infrastructure Layer
//!
//! Concrete implementations behind the SessionGuard token lifecycle.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL connection pool, migrations and the refresh token repository
//! - **Telemetry**: tracing subscriber setup
//! - **Wiring**: [`initialize`] builds everything the token services need
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

use sg_core::errors::DomainError;
use sg_core::repositories::UserDirectory;
use sg_core::services::token::{RefreshTokenStore, TokenCleanupService, TokenService};
use sg_shared::config::AppConfig;
use sg_shared::ConfigError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber initialisation
pub mod telemetry;

#[cfg(feature = "mysql")]
use database::{DatabasePool, MySqlTokenRepository};

/// Infrastructure service container
#[cfg(feature = "mysql")]
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Database connection pool
    pub pool: DatabasePool,
    /// Refresh token storage
    pub token_repository: Arc<MySqlTokenRepository>,
    /// Configuration the services were built from
    pub config: Arc<AppConfig>,
}

#[cfg(feature = "mysql")]
impl InfrastructureServices {
    /// Token service over the MySQL repository and the given user directory
    pub fn token_service<U: UserDirectory>(
        &self,
        directory: Arc<U>,
    ) -> Result<TokenService<MySqlTokenRepository, U>, InfrastructureError> {
        Ok(TokenService::new(
            Arc::clone(&self.token_repository),
            directory,
            &self.config.jwt,
            &self.config.token_policy,
        )?)
    }

    /// Expired token reaper over the MySQL repository
    pub fn cleanup_service(&self) -> TokenCleanupService<MySqlTokenRepository> {
        let store = RefreshTokenStore::new(
            Arc::clone(&self.token_repository),
            chrono::Duration::seconds(self.config.jwt.refresh_token_expiry_seconds()),
        );
        TokenCleanupService::new(store, self.config.cleanup.clone())
    }
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The database connection pool, pinged once
/// - Pending schema migrations
/// - The refresh token repository
#[cfg(feature = "mysql")]
pub async fn initialize(config: AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing infrastructure services");

    let pool = DatabasePool::new(&config.database).await?;
    pool.ping().await?;
    pool.run_migrations().await?;

    let token_repository = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        pool,
        token_repository,
        config: Arc::new(config),
    })
}

/// Load configuration from the process environment
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    Ok(AppConfig::from_env()?)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[cfg(feature = "mysql")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Configuration that parsed but cannot be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by a domain service
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
