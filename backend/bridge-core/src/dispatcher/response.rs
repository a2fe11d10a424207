use crate::codec::{MethodName, Reply};
use crate::error::dispatch::DispatchError;

use common::ErrorLocation;

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored credential as returned by `getPasswords`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: String,
    pub url: String,
    /// Ciphertext, opaque to this crate.
    pub password: String,
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("id", &self.id)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Session marker returned by `signin` and `createUser`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub username: Option<String>,
}

/// Method-specific success payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Session(Session),
    BooleanAck(bool),
    SecretList(Vec<SecretRecord>),
    PlaintextSecret(String),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Session(session) => f.debug_tuple("Session").field(session).finish(),
            Payload::BooleanAck(ack) => f.debug_tuple("BooleanAck").field(ack).finish(),
            Payload::SecretList(records) => f.debug_tuple("SecretList").field(records).finish(),
            Payload::PlaintextSecret(_) => f.write_str("PlaintextSecret([REDACTED])"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The native module reported a logical failure (bad credentials, unknown id).
    Call,
    /// The reply could not be decoded or had the wrong shape.
    Protocol,
    /// The native module could not be loaded or returned nothing.
    Gateway,
    /// The request could not be built from what the caller sent.
    InvalidRequest,
}

/// Outcome of one operation as delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success {
        payload: Payload,
    },
    Failure {
        kind: FailureKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl Response {
    pub fn success(payload: Payload) -> Self {
        Response::Success { payload }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Response::Failure {
            kind,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Response::Success { payload } => Some(payload),
            Response::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Response::Success { .. } => None,
            Response::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Turn a classified reply into the typed response for `method`.
///
/// # Errors
///
/// Returns [`DispatchError::Protocol`] when a success reply does not have the
/// shape `method` returns.
pub fn interpret(method: MethodName, reply: Reply) -> Result<Response, DispatchError> {
    let value = match reply {
        Reply::Failure { message } => {
            return Ok(Response::Failure {
                kind: FailureKind::Call,
                message,
            });
        }
        Reply::Success(value) => value,
    };

    let payload = match method {
        MethodName::Signin | MethodName::CreateUser => Payload::Session(session(method, value)?),
        MethodName::Signout
        | MethodName::CreatePassword
        | MethodName::DeletePassword
        | MethodName::DeleteUser => match value {
            Value::Bool(true) => Payload::BooleanAck(true),
            other => return Err(protocol(method, format!("expected true, got {}", kind_of(&other)))),
        },
        MethodName::Decrypt => match value {
            Value::String(plaintext) => Payload::PlaintextSecret(plaintext),
            other => {
                return Err(protocol(
                    method,
                    format!("expected a string, got {}", kind_of(&other)),
                ));
            }
        },
        MethodName::GetPasswords => {
            let records: Vec<SecretRecord> = serde_json::from_value(value)
                .map_err(|e| protocol(method, format!("expected a list of secrets: {e}")))?;
            Payload::SecretList(records)
        }
    };

    Ok(Response::success(payload))
}

#[track_caller]
fn session(method: MethodName, value: Value) -> Result<Session, DispatchError> {
    match value {
        Value::Bool(true) => Ok(Session::default()),
        Value::Object(map) => match map.get("username") {
            None => Ok(Session::default()),
            Some(Value::String(username)) => Ok(Session {
                username: Some(username.clone()),
            }),
            Some(other) => Err(protocol(
                method,
                format!("username must be a string, got {}", kind_of(other)),
            )),
        },
        other => Err(protocol(
            method,
            format!("expected a session marker, got {}", kind_of(&other)),
        )),
    }
}

#[track_caller]
fn protocol(method: MethodName, message: String) -> DispatchError {
    DispatchError::Protocol {
        method: method.to_string(),
        message,
        location: ErrorLocation::from(Location::caller()),
    }
}

// Names the JSON type without echoing a value that may be secret.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
