//! Process startup steps, in order.
//!
//! 1. [`resolve_config`]: `config.json`, then `.env` / environment overrides
//! 2. [`load_gateway`]: bind the native module; failure aborts startup
//! 3. [`start_responder`]: serve the dispatcher over the bridge

use crate::error::PassguardError;

use bridge_core::bridge::{BridgeServerHandle, Responder, start_bridge_server};
use bridge_core::config::{AppConfig, EnvOverrides, try_load_dotenv};
use bridge_core::dispatcher::Dispatcher;
use bridge_core::gateway::NativeGateway;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};

const APP_DIR_NAME: &str = "passguard";
const LOG_DIR_NAME: &str = "logs";

/// `<platform data dir>/passguard/logs`, falling back to the temp dir.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(LOG_DIR_NAME)
}

/// Load `config.json` from `config_dir` and layer environment overrides on top.
///
/// # Errors
///
/// Returns [`PassguardError::Config`] if the file is invalid or an override is.
pub fn resolve_config(config_dir: &Path) -> Result<AppConfig, PassguardError> {
    try_load_dotenv();

    let mut config = AppConfig::load(config_dir)?;
    let overrides = EnvOverrides::from_env();
    if !overrides.is_empty() {
        config.apply_overrides(&overrides)?;
    }

    info!(
        "Native module {} via {} codec",
        config.library_path().display(),
        config.native.codec
    );
    Ok(config)
}

/// Bind the native entry point now, so a missing library stops the process
/// before any request is accepted.
///
/// # Errors
///
/// Returns [`PassguardError::Load`] if the library or its entry point is missing.
pub fn load_gateway(config: &AppConfig) -> Result<Arc<NativeGateway>, PassguardError> {
    let gateway = NativeGateway::new(config.library_source());

    if let Err(e) = gateway.ensure_loaded() {
        error!("Native module failed to load: {}", e);
        return Err(PassguardError::from(e));
    }

    Ok(Arc::new(gateway))
}

/// Start the bridge server answering with a dispatcher over `gateway`.
///
/// # Errors
///
/// Returns [`PassguardError::Bridge`] if the port cannot be bound.
pub async fn start_responder(
    config: &AppConfig,
    gateway: Arc<NativeGateway>,
) -> Result<BridgeServerHandle, PassguardError> {
    if !gateway.is_loaded() {
        return Err(PassguardError::Load {
            message: String::from("Native module must be loaded before the bridge starts"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let dispatcher = Dispatcher::new(gateway, config.native.codec.codec());
    let responder = Responder::new(Arc::new(dispatcher));

    let handle =
        start_bridge_server(config.bridge.port, config.bridge.auth_token.clone(), responder)
            .await?;

    info!("Bridge server started on {}", handle.local_addr());
    Ok(handle)
}
