use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Interior Nul Error: field '{field}' contains a NUL byte {location}")]
    InteriorNul {
        field: &'static str,
        location: ErrorLocation,
    },

    #[error("Too Many Params Error: {method} has {count} params, the fixed record holds 2 {location}")]
    TooManyParams {
        method: String,
        count: usize,
        location: ErrorLocation,
    },

    #[error("Unknown Codec Error: '{name}' is not json_envelope or fixed_record {location}")]
    UnknownCodec {
        name: String,
        location: ErrorLocation,
    },

    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },
}
