//! Reply classification shared by both codec variants.
//!
//! The native module signals failure three ways: the literal `false`, the
//! literal `null`, or an object `{"error": true, "message": ...}`. Everything
//! else is a success payload, including falsy-looking values such as `[]`,
//! `""` and `0`.

use crate::error::codec::CodecError;

use common::ErrorLocation;

use std::panic::Location;

use serde_json::Value;

/// A decoded reply with an explicit discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(Value),
    Failure { message: Option<String> },
}

impl Reply {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }
}

/// Parse native reply text and classify it.
pub fn decode_reply(raw: &[u8]) -> Result<Reply, CodecError> {
    let text = std::str::from_utf8(raw).map_err(|e| CodecError::Decode {
        message: format!("Reply is not valid UTF-8: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let value: Value = serde_json::from_str(text).map_err(|e| CodecError::Decode {
        message: format!("Reply is not valid JSON: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(classify(value))
}

pub(crate) fn classify(value: Value) -> Reply {
    match value {
        Value::Null | Value::Bool(false) => Reply::Failure { message: None },
        Value::Object(ref map) if map.get("error") == Some(&Value::Bool(true)) => {
            let message = map.get("message").map(|message| match message {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            });
            Reply::Failure { message }
        }
        other => Reply::Success(other),
    }
}
