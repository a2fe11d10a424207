use crate::error::codec::CodecError;
use crate::error::gateway::GatewayError;

use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DispatchError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The reply decoded as JSON but does not have the shape `method` returns.
    #[error("Protocol Error: {method}: {message} {location}")]
    Protocol {
        method: String,
        message: String,
        location: ErrorLocation,
    },
}
