//! Expired refresh token reaper
//!
//! Deletes refresh tokens past their expiry on the configured interval until
//! interrupted. `--once` runs a single cycle and exits.

use std::sync::Arc;

use anyhow::Context;
use sg_infra::telemetry::init_tracing;
use sg_infra::{initialize, load_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let run_once = std::env::args().skip(1).any(|arg| arg == "--once");

    let config = load_config().context("invalid configuration")?;
    init_tracing(&config.logging)?;

    let services = initialize(config).await?;
    let cleanup = Arc::new(services.cleanup_service());

    if run_once {
        let result = cleanup.run_cleanup().await?;
        tracing::info!(
            expired_tokens_deleted = result.expired_tokens_deleted,
            pool = %services.pool.usage(),
            "Single cleanup cycle finished"
        );
        services.pool.close().await;
        return Ok(());
    }

    let Some(handle) = Arc::clone(&cleanup).start_background_task() else {
        services.pool.close().await;
        return Ok(());
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!(pool = %services.pool.usage(), "Shutdown signal received, stopping token reaper");

    handle.abort();
    services.pool.close().await;
    Ok(())
}
