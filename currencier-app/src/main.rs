//! # Currencier Application
//!
//! Binary that wires together all the components:
//! - Load configuration from flags, environment and an optional YAML file
//! - Initialize logging
//! - Initialize the repository and feed adapters
//! - Start the HTTP server and the refresh scheduler
//! - Stop both on Ctrl-C / SIGTERM

mod config;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cbr_rates::CbrSource;
use currencier_hex::{CurrencierService, RefreshScheduler, inbound::HttpServer, shutdown_channel};
use currencier_repo::build_repo;

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str = "info,currencier_hex=debug,currencier_app=debug";

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if config.debug {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_logging(&config)?;

    tracing::info!("Starting currencier on port {}", config.port);
    tracing::info!(
        "Refreshing from {} every {}",
        config.update_source,
        humantime::format_duration(config.update_interval)
    );

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let source = CbrSource::new(config.update_source.clone(), config.source_timeout)?;

    let service = Arc::new(CurrencierService::new(source, repo));
    let listener = TcpListener::bind(config.listen_addr()).await?;

    let (trigger, shutdown) = shutdown_channel();

    let server = HttpServer::new(service.clone());
    let mut server_task = tokio::spawn(server.serve(listener, shutdown.clone()));

    let scheduler = RefreshScheduler::new(service, config.update_interval);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown));

    let early_exit = tokio::select! {
        _ = shutdown_signal() => None,
        result = &mut server_task => Some(result),
    };
    if early_exit.is_some() {
        tracing::error!("HTTP server exited before shutdown was requested");
    }

    trigger.trigger();
    let server_result = match early_exit {
        Some(result) => result,
        None => server_task.await,
    };
    scheduler_task.await?;
    server_result??;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, stopping server and scheduler...");
}
