//! Bridge WebSocket server (responder process).
//!
//! - Listens on localhost only
//! - Requires an auth handshake as the first frame
//! - Handles each request on its own task, so a slow native call on one
//!   channel does not hold up replies on another
//! - Funnels every reply through a single writer task per connection

use crate::BRIDGE_HOSTNAME;
use crate::bridge::channel::response_channel_name;
use crate::bridge::connection_state::ConnectionState;
use crate::bridge::envelope::{BridgeReply, ClientFrame, ServerFrame};
use crate::bridge::handle::BridgeServerHandle;
use crate::bridge::responder::Responder;
use crate::dispatcher::{FailureKind, Response};
use crate::error::bridge::BridgeError;

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use uuid::Uuid;

type WsWrite = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Replies buffered per connection before request tasks wait on the writer.
const REPLY_BUFFER: usize = 64;

/// Starts the bridge server on `127.0.0.1:<port>`.
///
/// Port `0` binds an ephemeral port; read it back from the handle.
///
/// # Errors
///
/// Returns [`BridgeError::Io`] if the port cannot be bound.
pub async fn start_bridge_server(
    port: u16,
    auth_token: Option<String>,
    responder: Responder,
) -> Result<BridgeServerHandle, BridgeError> {
    let auth_token = auth_token.unwrap_or_else(|| {
        info!("No bridge auth token configured, generated a new one");
        Uuid::new_v4().to_string()
    });

    let address = format!("{BRIDGE_HOSTNAME}:{port}");
    let listener = TcpListener::bind(&address).await?;
    let local_addr = listener.local_addr()?;

    info!("Bridge server listening on {}", local_addr);

    let token = auth_token.clone();
    let accept_task = TokioSpawn(async move {
        while let Ok((stream, addr)) = listener.accept().await {
            info!("Client connecting from {}", addr);
            let token_clone = token.clone();
            let responder_clone = responder.clone();
            TokioSpawn(async move {
                if let Err(e) = handle_connection(stream, addr, token_clone, responder_clone).await {
                    error!("Connection {} ended with error: {}", addr, e);
                }
            });
        }
    });

    Ok(BridgeServerHandle::new(local_addr, auth_token, accept_task))
}

/// Handles a single WebSocket connection.
///
/// 1. Rejects non-loopback peers
/// 2. Requires `ClientFrame::Auth` with the expected token as the first frame
/// 3. Answers every `ClientFrame::Request` on its `-response` channel
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    auth_token: String,
    responder: Responder,
) -> Result<(), BridgeError> {
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback connection from {}", addr);
        return Ok(());
    }

    let ws_stream = accept_async(stream).await.map_err(|e| BridgeError::Handshake {
        message: format!("WebSocket handshake failed: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let (mut write, mut read) = ws_stream.split();
    let mut state = ConnectionState::new(auth_token);

    match read.next().await {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientFrame>(text.as_str()) {
            Ok(ClientFrame::Auth { token }) if state.validate_token(&token) => {
                info!("Client {} authenticated", addr);
                send_frame(&mut write, &ServerFrame::AuthResponse {
                    success: true,
                    error: None,
                })
                .await?;
            }
            Ok(ClientFrame::Auth { .. }) => {
                warn!("Client {} auth failed: invalid token", addr);
                send_frame(&mut write, &ServerFrame::AuthResponse {
                    success: false,
                    error: Some(String::from("Invalid authentication token")),
                })
                .await?;
                return Ok(());
            }
            _ => {
                warn!("Client {} auth failed: first frame was not an auth handshake", addr);
                return Ok(());
            }
        },
        Some(Ok(_)) => {
            warn!("Client {} sent a non-text first frame", addr);
            return Ok(());
        }
        Some(Err(e)) => {
            return Err(BridgeError::Read {
                message: format!("Error reading first frame: {e}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        None => {
            warn!("Client {} disconnected before sending auth", addr);
            return Ok(());
        }
    }

    debug_assert!(state.is_authenticated());

    let (reply_tx, mut reply_rx) = mpsc::channel::<BridgeReply>(REPLY_BUFFER);

    let writer = TokioSpawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            if let Err(e) = send_frame(&mut write, &ServerFrame::Reply(reply)).await {
                error!("Failed to write reply: {}", e);
                break;
            }
        }
    });

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let raw: Value = match serde_json::from_str(text.as_str()) {
                    Ok(raw) => raw,
                    Err(e) => {
                        error!("Client {} sent invalid JSON: {}", addr, e);
                        let _ = reply_tx.send(rejected(&Value::Null, "Invalid JSON frame")).await;
                        continue;
                    }
                };

                match serde_json::from_value::<ClientFrame>(raw.clone()) {
                    Ok(ClientFrame::Request(request)) => {
                        let responder = responder.clone();
                        let reply_tx = reply_tx.clone();
                        TokioSpawn(async move {
                            let reply = responder.respond(request).await;
                            if reply_tx.send(reply).await.is_err() {
                                warn!("Connection closed before reply could be written");
                            }
                        });
                    }
                    Ok(ClientFrame::Auth { .. }) => {
                        let _ = reply_tx
                            .send(rejected(&raw, "Auth handshake already completed"))
                            .await;
                    }
                    Err(e) => {
                        warn!("Client {} sent an unrecognised frame: {}", addr, e);
                        let _ = reply_tx
                            .send(rejected(&raw, &format!("Unrecognised frame: {e}")))
                            .await;
                    }
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                warn!("Client {} sent a non-text frame after auth", addr);
            }
            Err(e) => {
                drop(reply_tx);
                let _ = writer.await;
                return Err(BridgeError::Read {
                    message: format!("Error reading frame: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }

    // In-flight requests hold their own senders; the writer drains them.
    drop(reply_tx);
    let _ = writer.await;

    info!("Client {} disconnected", addr);
    Ok(())
}

/// Best-effort reply for a frame that could not be parsed as a request.
fn rejected(raw: &Value, message: &str) -> BridgeReply {
    let request_id = raw.get("request_id").and_then(Value::as_u64).unwrap_or(0);
    let channel = raw.get("channel").and_then(Value::as_str).unwrap_or("bridge");

    BridgeReply {
        request_id,
        channel: response_channel_name(channel),
        response: Response::failure(FailureKind::InvalidRequest, message),
    }
}

async fn send_frame(write: &mut WsWrite, frame: &ServerFrame) -> Result<(), BridgeError> {
    let text = serde_json::to_string(frame)?;

    write
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| BridgeError::Send {
            message: format!("Failed to send frame: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
