use translator::config::{self, AppConfig};
use translator::error::TranslatorError;
use translator::logger::initialize as LoggerInitialize;
use translator::routes::router;
use translator::state::AppState;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The logger may not be up yet.
            eprintln!("{e}");
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), TranslatorError> {
    // A missing .env is normal.
    let dotenv = dotenvy::dotenv();

    let config_dir = config::config_dir()?;
    let config = AppConfig::load(&config_dir)?;

    let log_dir = config::log_dir()?;
    create_dir_all(&log_dir).map_err(|e| TranslatorError::Translator {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir, config.log_level()?)?;

    info!("Translator service starting");
    info!("Config directory: {}", config_dir.display());
    info!("Log directory: {}", log_dir.display());
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TranslatorError::Server {
            message: format!("Failed to bind to {addr}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Translator listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TranslatorError::Server {
            message: format!("Server error: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Translator stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
