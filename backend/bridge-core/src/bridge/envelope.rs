//! JSON frames exchanged over the bridge socket.

use crate::dispatcher::Response;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named request. `request_id` is chosen by the caller and echoed in the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub request_id: u64,
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}

/// A reply on `<channel>-response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeReply {
    pub request_id: u64,
    pub channel: String,
    pub response: Response,
}

/// Client → server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Auth { token: String },
    Request(BridgeRequest),
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    AuthResponse {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Reply(BridgeReply),
}
