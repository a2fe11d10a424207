use bridge_core::error::bridge::BridgeError;
use bridge_core::error::config::ConfigError;
use bridge_core::error::gateway::GatewayError;

use common::ErrorLocation;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the process shell.
///
/// Serializable so the startup failure can be reported to the UI process as JSON.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum PassguardError {
    /// Error from this app
    #[error("Passguard Error: {message} {location}")]
    Passguard {
        message: String,
        location: ErrorLocation,
    },

    /// Config could not be read, parsed or validated
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Native module could not be loaded; fatal at startup
    #[error("Load Error: {message} {location}")]
    Load {
        message: String,
        location: ErrorLocation,
    },

    /// Bridge transport failed
    #[error("Bridge Error: {message} {location}")]
    Bridge {
        message: String,
        location: ErrorLocation,
    },

    /// View state actor is gone
    #[error("State Error: {message} {location}")]
    State {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ConfigError> for PassguardError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        PassguardError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<GatewayError> for PassguardError {
    #[track_caller]
    fn from(error: GatewayError) -> Self {
        PassguardError::Load {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<BridgeError> for PassguardError {
    #[track_caller]
    fn from(error: BridgeError) -> Self {
        PassguardError::Bridge {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
