//! Responder side of the bridge: turns named requests into dispatcher calls.

use crate::bridge::channel::{Channel, response_channel_name};
use crate::bridge::envelope::{BridgeReply, BridgeRequest};
use crate::dispatcher::{Dispatcher, FailureKind, Operation, Response};

use std::str::FromStr;
use std::sync::Arc;

use log::{debug, error, warn};

/// Answers [`BridgeRequest`]s using one shared [`Dispatcher`].
///
/// This type is `Clone`; every clone shares the dispatcher and therefore the
/// single native gateway.
#[derive(Clone)]
pub struct Responder {
    dispatcher: Arc<Dispatcher>,
}

impl Responder {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Answer one request on its `-response` channel.
    ///
    /// Never fails: unknown channels and malformed payloads are answered with
    /// [`FailureKind::InvalidRequest`].
    pub async fn respond(&self, request: BridgeRequest) -> BridgeReply {
        let BridgeRequest {
            request_id,
            channel,
            payload,
        } = request;

        debug!("Request {} on {}", request_id, channel);

        let response = match Channel::from_str(&channel).and_then(|ch| ch.operation(payload)) {
            Ok(operation) => self.run(operation).await,
            Err(e) => {
                warn!("Rejected request {} on {}: {}", request_id, channel, e);
                Response::failure(FailureKind::InvalidRequest, e.to_string())
            }
        };

        BridgeReply {
            request_id,
            channel: response_channel_name(&channel),
            response,
        }
    }

    // The native call blocks, so it runs off the async workers.
    async fn run(&self, operation: Operation) -> Response {
        let dispatcher = Arc::clone(&self.dispatcher);
        let method = operation.method();

        match tokio::task::spawn_blocking(move || dispatcher.dispatch(&operation)).await {
            Ok(response) => response,
            Err(e) => {
                error!("Native call for {} did not complete: {}", method, e);
                Response::failure(
                    FailureKind::Gateway,
                    format!("Native call for {method} did not complete: {e}"),
                )
            }
        }
    }
}
