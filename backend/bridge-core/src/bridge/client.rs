//! Bridge WebSocket client (caller process).

use crate::BRIDGE_BASE_URL;
use crate::bridge::channel::Channel;
use crate::bridge::envelope::{BridgeRequest, ClientFrame, ServerFrame};
use crate::bridge::ledger::{PendingCall, PendingLedger};
use crate::dispatcher::Response;
use crate::error::bridge::BridgeError;

use common::ErrorLocation;

use std::panic::Location;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Requests queued for the writer task.
const OUTBOUND_BUFFER: usize = 64;

/// Authenticated connection to a bridge server.
///
/// Replies are matched to callers through a [`PendingLedger`]; any number of
/// calls, on the same or different channels, may be in flight at once.
pub struct BridgeClient {
    ledger: PendingLedger,
    outbound: mpsc::Sender<BridgeRequest>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl BridgeClient {
    /// Connect to `ws://127.0.0.1:<port>` and authenticate.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Handshake`] if the WebSocket connection fails
    /// - [`BridgeError::Auth`] if the server rejects the token or closes
    pub async fn connect(port: u16, auth_token: &str) -> Result<Self, BridgeError> {
        let url = format!("{BRIDGE_BASE_URL}:{port}");
        let (ws_stream, _) = connect_async(url.as_str()).await.map_err(|e| BridgeError::Handshake {
            message: format!("Failed to connect to {url}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let (mut write, mut read) = ws_stream.split();

        let auth = serde_json::to_string(&ClientFrame::Auth {
            token: auth_token.to_string(),
        })?;
        write
            .send(Message::Text(auth.into()))
            .await
            .map_err(|e| BridgeError::Send {
                message: format!("Failed to send auth handshake: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match read.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerFrame>(text.as_str())? {
                ServerFrame::AuthResponse { success: true, .. } => {
                    info!("Authenticated with bridge on port {}", port);
                }
                ServerFrame::AuthResponse { error, .. } => {
                    return Err(BridgeError::Auth {
                        message: error.unwrap_or_else(|| String::from("Authentication rejected")),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                ServerFrame::Reply(_) => {
                    return Err(BridgeError::Auth {
                        message: String::from("Expected auth response, got a reply"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            },
            _ => {
                return Err(BridgeError::Auth {
                    message: String::from("Connection closed during auth handshake"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let ledger = PendingLedger::new();
        let (outbound, mut outbound_rx) = mpsc::channel::<BridgeRequest>(OUTBOUND_BUFFER);

        let writer = tokio::spawn(async move {
            while let Some(request) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&ClientFrame::Request(request)) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to encode request: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(text.into())).await {
                    error!("Failed to send request: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        });

        let reader_ledger = ledger.clone();
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(text.as_str()) {
                        Ok(ServerFrame::Reply(reply)) => {
                            let delivery = reader_ledger.deliver(reply);
                            debug!("Reply delivery: {:?}", delivery);
                        }
                        Ok(ServerFrame::AuthResponse { .. }) => {
                            warn!("Ignoring unexpected auth response");
                        }
                        Err(e) => error!("Failed to decode server frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        error!("Bridge connection failed: {}", e);
                        break;
                    }
                }
            }
            reader_ledger.close_all();
            info!("Bridge connection closed");
        });

        Ok(Self {
            ledger,
            outbound,
            reader,
            writer,
        })
    }

    /// Send a named request and return the window its reply will arrive in.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the connection is gone.
    pub async fn send(&self, channel: Channel, payload: Value) -> Result<PendingCall, BridgeError> {
        let pending = self.ledger.register(channel);

        let request = BridgeRequest {
            request_id: pending.request_id(),
            channel: channel.name().to_string(),
            payload,
        };

        self.outbound
            .send(request)
            .await
            .map_err(|_| BridgeError::Closed {
                message: format!("Cannot send on {channel}: connection closed"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(pending)
    }

    /// Send a named request and wait for its reply.
    pub async fn call(&self, channel: Channel, payload: Value) -> Result<Response, BridgeError> {
        self.send(channel, payload).await?.wait().await
    }

    pub fn ledger(&self) -> &PendingLedger {
        &self.ledger
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
        self.ledger.close_all();
    }
}
