//! # Swap Router Service
//!
//! Main entry point for the swap routing service.

use swap_router::application::engine::RoutingEngine;
use swap_router::config::{AppConfig, LogFormat};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log.level.clone()));
    match config.log.format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).pretty().init(),
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "starting swap router"
    );

    let engine = RoutingEngine::from_config(&config).await?;
    for descriptor in engine.registry().descriptors().await {
        info!(
            venue = %descriptor.venue_id(),
            active = descriptor.is_active(),
            fee_pm = descriptor.fee_pm(),
            chains = descriptor.chains().len(),
            "venue registered"
        );
    }

    info!("swap router started");

    tokio::signal::ctrl_c().await?;
    info!("shutting down swap router");

    Ok(())
}
