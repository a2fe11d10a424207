use common::ErrorLocation;

use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum GatewayError {
    #[error("Library Load Error: {path}: {message} {location}")]
    LibraryNotFound {
        path: PathBuf,
        message: String,
        location: ErrorLocation,
    },

    #[error("Symbol Load Error: '{symbol}': {message} {location}")]
    SymbolNotFound {
        symbol: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Null Reply Error: native entry point returned a null pointer {location}")]
    NullReply { location: ErrorLocation },

    #[error("Call Lock Error: {message} {location}")]
    Poisoned {
        message: String,
        location: ErrorLocation,
    },
}

impl GatewayError {
    /// Load errors are fatal to the process that owns the gateway.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            GatewayError::LibraryNotFound { .. } | GatewayError::SymbolNotFound { .. }
        )
    }
}
