//! tachi-server - score import and goal evaluation service
//!
//! Configuration priority: command line (or `TACHI_*` environment
//! variables), then the TOML bootstrap file, then compiled defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tachi_common::config::TomlConfig;
use tokio::signal;
use tracing::info;

use tachi_server::db::{self, SqliteDatastore};
use tachi_server::AppState;

/// Command-line arguments for tachi-server
#[derive(Parser, Debug)]
#[command(name = "tachi-server")]
#[command(about = "Rhythm game score import and goal evaluation service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "TACHI_PORT")]
    port: Option<u16>,

    /// TOML bootstrap config file
    #[arg(short, long, env = "TACHI_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, env = "TACHI_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    tachi_common::logging::init_tracing(&config.logging)
        .context("Failed to initialize logging")?;

    info!("Starting tachi-server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let db_path = args
        .database
        .clone()
        .unwrap_or_else(|| config.resolved_database_path());
    info!("Database: {}", db_path.display());

    let pool = db::init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    let datastore = Arc::new(SqliteDatastore::new(pool));
    let state = AppState::new(datastore, Arc::new(config.import.clone()));
    let app = tachi_server::build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", config.bind_address, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
