use passguard::error::PassguardError;
use passguard::logger::initialize as LoggerInitialize;
use passguard::startup::{default_log_dir, load_gateway, resolve_config, start_responder};

use bridge_core::config::default_config_dir;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use log::{error, info};
use serde_json::json;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Passguard exited with error: {}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), PassguardError> {
    let log_dir = default_log_dir();

    create_dir_all(&log_dir).map_err(|e| PassguardError::Passguard {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("Passguard starting");
    info!("Log directory: {}", log_dir.display());

    let config_dir = default_config_dir().ok_or_else(|| PassguardError::Config {
        message: String::from("No platform config directory"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let config = resolve_config(&config_dir)?;
    let gateway = load_gateway(&config)?;
    let handle = start_responder(&config, gateway).await?;

    // The UI process reads this line to find and authenticate with the bridge.
    println!(
        "{}",
        json!({"port": handle.port(), "auth_token": handle.auth_token()})
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| PassguardError::Passguard {
            message: format!("Failed to listen for Ctrl-C: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Shutting down");
    handle.shutdown();
    Ok(())
}
