//! Tracing subscriber setup
//!
//! One global subscriber per process, configured from [`LoggingConfig`].
//! `RUST_LOG`, when set, replaces the configured level.

use sg_shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::InfrastructureError;

/// Install the global tracing subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let env_filter = filter_for(&config.level, std::env::var("RUST_LOG").ok());
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
    };

    installed.map_err(|e| InfrastructureError::Telemetry(e.to_string()))?;

    tracing::info!(level = %config.level, format = ?config.format, "Tracing initialised");
    Ok(())
}

/// Filter from `RUST_LOG` or the configured level, with SQLx kept quiet
fn filter_for(level: &str, rust_log: Option<String>) -> EnvFilter {
    let base = rust_log
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| level.to_string());

    EnvFilter::try_new(&base)
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(
            "sqlx=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
}
