//! Caller-side table of requests awaiting a reply.
//!
//! A reply is handed to the caller whose `request_id` it echoes, never to
//! whichever caller happens to be listening on the reply channel. A
//! [`PendingCall`] unregisters itself when dropped, whether it completed or
//! its owner gave up, so no stale handler survives to swallow a later reply.

use crate::bridge::channel::Channel;
use crate::bridge::envelope::BridgeReply;
use crate::dispatcher::Response;
use crate::error::bridge::BridgeError;

use common::ErrorLocation;

use std::collections::HashMap;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use tokio::sync::oneshot;

/// What happened to a reply handed to [`PendingLedger::deliver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Matched and handed to its caller.
    Delivered,
    /// Matched, but the caller stopped waiting before it arrived.
    Abandoned,
    /// No open request has this id.
    Unmatched,
    /// The id is open but the reply came on a different channel; the caller keeps waiting.
    ChannelMismatch { expected: String },
}

struct PendingEntry {
    channel: Channel,
    reply_tx: oneshot::Sender<Response>,
}

struct LedgerInner {
    next_request_id: AtomicU64,
    pending: Mutex<HashMap<u64, PendingEntry>>,
}

impl LedgerInner {
    fn pending(&self) -> MutexGuard<'_, HashMap<u64, PendingEntry>> {
        // Entries stay consistent even if a holder panicked.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shared ledger of open reply windows.
///
/// This type is `Clone`; all clones share the same table.
#[derive(Clone)]
pub struct PendingLedger {
    inner: Arc<LedgerInner>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                next_request_id: AtomicU64::new(1),
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Open a reply window on `channel` under a fresh request id.
    pub fn register(&self, channel: Channel) -> PendingCall {
        let request_id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();

        self.inner
            .pending()
            .insert(request_id, PendingEntry { channel, reply_tx });
        debug!("Awaiting {} for request {}", channel.response_name(), request_id);

        PendingCall {
            request_id,
            channel,
            reply_rx,
            ledger: Arc::clone(&self.inner),
        }
    }

    /// Route a reply to the caller that sent its request.
    pub fn deliver(&self, reply: BridgeReply) -> Delivery {
        let mut pending = self.inner.pending();

        let Some(entry) = pending.get(&reply.request_id) else {
            warn!(
                "Dropping reply on {} for unknown request {}",
                reply.channel, reply.request_id
            );
            return Delivery::Unmatched;
        };

        let expected = entry.channel.response_name();
        if reply.channel != expected {
            warn!(
                "Dropping reply for request {}: arrived on {}, expected {}",
                reply.request_id, reply.channel, expected
            );
            return Delivery::ChannelMismatch { expected };
        }

        let Some(entry) = pending.remove(&reply.request_id) else {
            return Delivery::Unmatched;
        };
        drop(pending);

        match entry.reply_tx.send(reply.response) {
            Ok(()) => Delivery::Delivered,
            Err(_) => {
                debug!("Caller for request {} stopped waiting", reply.request_id);
                Delivery::Abandoned
            }
        }
    }

    /// Number of open windows on `channel`.
    pub fn awaiting(&self, channel: Channel) -> usize {
        self.inner
            .pending()
            .values()
            .filter(|entry| entry.channel == channel)
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close every open window; their callers observe [`BridgeError::Closed`].
    pub fn close_all(&self) {
        let drained: Vec<_> = self.inner.pending().drain().collect();
        if !drained.is_empty() {
            warn!("Closing {} pending requests", drained.len());
        }
    }
}

impl Default for PendingLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// One open reply window. Dropping it unregisters the request.
pub struct PendingCall {
    request_id: u64,
    channel: Channel,
    reply_rx: oneshot::Receiver<Response>,
    ledger: Arc<LedgerInner>,
}

impl PendingCall {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Wait for the reply. There is no timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the ledger was closed (connection lost)
    /// before a reply arrived.
    pub async fn wait(mut self) -> Result<Response, BridgeError> {
        (&mut self.reply_rx).await.map_err(|_| BridgeError::Closed {
            message: format!(
                "{} closed before request {} was answered",
                self.channel.response_name(),
                self.request_id
            ),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        if self.ledger.pending().remove(&self.request_id).is_some() {
            debug!(
                "Stopped awaiting {} for request {}",
                self.channel.response_name(),
                self.request_id
            );
        }
    }
}
