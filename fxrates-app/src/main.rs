//! # FX Rates Worker
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize logging (and OTLP export when configured)
//! - Initialize the repository adapter
//! - Create the SDMX client and rate service
//! - Ingest the configured pair on every tick until Ctrl-C or SIGTERM

mod config;
mod telemetry;
mod worker;

use fxrates_repo::build_repo;
use fxrates_sdmx::SdmxClient;
use fxrates_service::RateService;

use worker::Worker;

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    let otel_provider = telemetry::init(config.app_env)?;

    tracing::info!(
        env = ?config.app_env,
        base = %config.base_currency,
        target = %config.target_currency,
        upstream = %config.client.base_url,
        "Starting exchange-rate worker"
    );

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let client = SdmxClient::new(config.client.clone())?;

    let worker = Worker::new(
        RateService::new(client, repo),
        config.base_currency,
        config.target_currency,
        config.lookback_days,
        config.interval,
    );

    worker.run(shutdown_signal()).await;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
