use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BridgeError {
    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },

    #[error("Auth Error: {message} {location}")]
    Auth {
        message: String,
        location: ErrorLocation,
    },

    #[error("Envelope Error: {message} {location}")]
    Envelope {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unknown Channel Error: '{channel}' {location}")]
    UnknownChannel {
        channel: String,
        location: ErrorLocation,
    },

    #[error("Invalid Payload Error: {channel}: {message} {location}")]
    InvalidPayload {
        channel: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for BridgeError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        BridgeError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        BridgeError::Envelope {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
