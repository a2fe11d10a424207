//! Named asynchronous request/reply channels across the process boundary.
//!
//! Each logical operation has a request channel (`signin`, `get-passwords`, ...)
//! and a reply channel named `<name>-response`. Every request carries a
//! `request_id` that its reply echoes, so overlapping calls on the same
//! channel are matched to the right caller instead of whichever listener
//! registered last.
//!
//! # Architecture
//!
//! - [`Responder`]: the process that owns the [`Dispatcher`](crate::dispatcher::Dispatcher)
//! - [`PendingLedger`]: caller-side table of open reply windows
//! - [`start_bridge_server`] / [`BridgeClient`]: localhost WebSocket transport
//!   with JSON text frames and an auth-token handshake
//!
//! # Protocol
//!
//! 1. Client sends `{"type":"auth","token":"..."}`
//! 2. Server answers `{"type":"auth_response","success":...}`; failure closes
//! 3. Client sends `{"type":"request","request_id":N,"channel":"...","payload":{...}}`
//! 4. Server answers `{"type":"reply","request_id":N,"channel":"...-response","response":{...}}`

mod channel;
mod client;
pub(crate) mod connection_state;
mod envelope;
mod handle;
mod ledger;
mod responder;
mod server;

pub use channel::{Channel, response_channel_name};
pub use client::BridgeClient;
pub use envelope::{BridgeReply, BridgeRequest, ClientFrame, ServerFrame};
pub use handle::BridgeServerHandle;
pub use ledger::{Delivery, PendingCall, PendingLedger};
pub use responder::Responder;
pub use server::start_bridge_server;
