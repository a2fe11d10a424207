use crate::codec::{Codec, CodecKind, Request, WireRequest};
use crate::error::codec::CodecError;

use common::ErrorLocation;

use std::ffi::CString;
use std::panic::Location;

use serde::Serialize;
use zeroize::Zeroizing;

#[derive(Serialize)]
struct Envelope<'a> {
    method: &'a str,
    params: &'a [String],
}

/// `{"method": "...", "params": [...]}` as one C string.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEnvelopeCodec;

impl Codec for JsonEnvelopeCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::JsonEnvelope
    }

    fn encode(&self, request: &Request) -> Result<WireRequest, CodecError> {
        let envelope = Envelope {
            method: request.method.as_str(),
            params: &request.params,
        };

        let text = serde_json::to_string(&envelope)
            .map(Zeroizing::new)
            .map_err(|e| CodecError::Encode {
                message: format!("Failed to serialize {} envelope: {e}", request.method),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // serde_json escapes NUL as \u0000, so this only fails on a serializer bug.
        let text = CString::new(text.as_bytes()).map_err(|_| CodecError::InteriorNul {
            field: "envelope",
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(WireRequest::Text(Zeroizing::new(text)))
    }
}
