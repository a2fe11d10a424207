//! Request encoding and reply decoding for the native entry point.
//!
//! Two request encodings exist for the same logical call:
//!
//! - [`JsonEnvelopeCodec`]: one NUL-terminated JSON text
//!   `{"method": "...", "params": [...]}` with any number of params.
//! - [`FixedRecordCodec`]: a `#[repr(C)]` record of three C strings
//!   (`method_name`, `param1`, `param2`); unset slots are empty strings.
//!
//! Replies are JSON text in both cases and decode through [`reply::decode_reply`]
//! into a [`Reply`] that carries an explicit success/failure discriminant.

pub mod fixed_record;
pub mod json_envelope;
pub mod reply;
pub mod request;

pub use fixed_record::{FixedRecord, FixedRecordCodec, RawParameters};
pub use json_envelope::JsonEnvelopeCodec;
pub use reply::Reply;
pub use request::{MethodName, Request, WireRequest};

use crate::error::codec::CodecError;

use common::ErrorLocation;

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Converts typed requests to the native wire form and raw replies back.
pub trait Codec: Send + Sync {
    fn kind(&self) -> CodecKind;

    fn encode(&self, request: &Request) -> Result<WireRequest, CodecError>;

    /// Reply encoding is shared by both variants.
    fn decode(&self, reply: &[u8]) -> Result<Reply, CodecError> {
        reply::decode_reply(reply)
    }
}

/// Which request encoding a deployment speaks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    #[default]
    JsonEnvelope,
    FixedRecord,
}

impl CodecKind {
    pub fn codec(self) -> Box<dyn Codec> {
        match self {
            CodecKind::JsonEnvelope => Box::new(JsonEnvelopeCodec),
            CodecKind::FixedRecord => Box::new(FixedRecordCodec),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CodecKind::JsonEnvelope => "json_envelope",
            CodecKind::FixedRecord => "fixed_record",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecKind {
    type Err = CodecError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "json_envelope" | "json" => Ok(CodecKind::JsonEnvelope),
            "fixed_record" | "record" => Ok(CodecKind::FixedRecord),
            other => Err(CodecError::UnknownCodec {
                name: other.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
