use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calaxis_core::{
    load_config, load_config_from_env, spawn_retention_sweeper, validate_config, Config,
};
use calaxis_server::{api::create_router, state::AppState};

/// Default config file, used only when present.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = resolve_config()?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Training: {} steps every {} ms",
        config.training.total_steps, config.training.step_interval_ms
    );
    info!("CORS origins: {:?}", config.cors.allowed_origins);

    // Create app state
    let state = Arc::new(AppState::new(config.clone()));

    // Start eviction if retention is configured
    let sweeper = spawn_retention_sweeper(Arc::clone(state.registry()), &config.jobs);
    if sweeper.is_none() {
        info!("Job retention disabled, jobs are kept until shutdown");
    }

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    Ok(())
}

/// Load config from `CALAXIS_CONFIG`, or `config.toml` if it exists, or defaults.
///
/// Environment overrides (`CALAXIS_SERVER__PORT=9000`) apply in every case.
fn resolve_config() -> Result<Config> {
    if let Ok(path) = std::env::var("CALAXIS_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        info!("Loading configuration from {:?}", default_path);
        return load_config(&default_path)
            .with_context(|| format!("Failed to load config from {:?}", default_path));
    }

    info!("No config file found, using defaults and environment");
    load_config_from_env().context("Failed to load config from environment")
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
