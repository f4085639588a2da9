//! ModGuard Server
//!
//! Accepts text and image submissions, classifies them in the background
//! against a remote reasoning model, and alerts on flagged content.

use anyhow::{Context, Result};
use clap::Parser;
use modguard_alerts::AlertDispatcher;
use modguard_classifiers::{ChatCompletionsClient, VerdictParser};
use modguard_engine::ModerationEngine;
use modguard_server::telemetry::{init_metrics, init_tracing};
use modguard_server::{create_router, security, AppState, Cli, ServerConfig};
use modguard_store::SqliteStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);
    info!("Starting ModGuard server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    security::validate_outbound_endpoints(&config)?;
    if config.allow_insecure_endpoints {
        warn!("Outbound endpoint validation disabled");
    }
    info!("Configuration loaded successfully");
    info!("Classifier: {} ({})", config.classifier.base_url, config.classifier.model);
    if config.classifier.api_key.is_none() {
        warn!("No classifier API key configured");
    }

    let metrics_handle = init_metrics()?;

    let store = SqliteStore::connect(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;

    let classifier = ChatCompletionsClient::new(config.classifier.to_client_config())
        .context("Failed to build classifier client")?;
    let parser = VerdictParser::new().context("Failed to build verdict parser")?;

    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let dispatcher = AlertDispatcher::from_config(&config.alerts, http);
    info!("Alert channels: {:?}", dispatcher.channel_names());

    let engine = ModerationEngine::start(
        &config.engine,
        Arc::new(store.clone()),
        Arc::new(classifier),
        Arc::new(parser),
        Arc::new(dispatcher),
    );

    let state = AppState::new(engine.orchestrator(), config.body_limit_bytes).with_metrics(metrics_handle);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    engine.shutdown().await;
    store.pool().close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
