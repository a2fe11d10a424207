use crate::error::PassguardError;

use bridge_core::dispatcher::SecretRecord;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};

/// Commands that mutate view state.
///
/// All mutations go through the state actor via these commands, so a reply
/// that lands while another is being applied never interleaves with it.
#[derive(Debug, Clone)]
pub enum ViewCommand {
    /// Sign-in or sign-up succeeded for this user
    SignedIn(String),

    /// Signed out; forget the user and every snapshot
    SignedOut,

    /// A fresh listing replaced the previous snapshot
    SecretsLoaded(Vec<SecretRecord>),

    /// The secret with this id was deleted
    SecretRemoved(String),
}

struct Envelope {
    command: ViewCommand,
    applied: oneshot::Sender<()>,
}

#[derive(Debug, Default)]
struct ViewData {
    username: Option<String>,
    secrets: Vec<SecretRecord>,
}

/// What the views render from.
///
/// Uses an actor pattern: commands are processed sequentially by a dedicated
/// task spawned lazily on first update. Reads go through an `RwLock`.
#[derive(Clone)]
pub struct ViewState {
    command_tx: Arc<Mutex<Option<mpsc::Sender<Envelope>>>>,
    data: Arc<RwLock<ViewData>>,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            command_tx: Arc::new(Mutex::new(None)),
            data: Arc::new(RwLock::new(ViewData::default())),
        }
    }

    /// Apply a command. Returns once the actor has applied it.
    ///
    /// # Errors
    ///
    /// Returns [`PassguardError::State`] if the actor has stopped.
    pub async fn update(&self, command: ViewCommand) -> Result<(), PassguardError> {
        let tx = self.sender().await;
        let (applied_tx, applied_rx) = oneshot::channel();

        tx.send(Envelope {
            command,
            applied: applied_tx,
        })
        .await
        .map_err(|e| PassguardError::State {
            message: format!("View state actor died: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        applied_rx.await.map_err(|e| PassguardError::State {
            message: format!("View state actor dropped a command: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    pub async fn username(&self) -> Option<String> {
        self.data.read().await.username.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.data.read().await.username.is_some()
    }

    /// Last loaded snapshot, in native order.
    pub async fn secrets(&self) -> Vec<SecretRecord> {
        self.data.read().await.secrets.clone()
    }

    async fn sender(&self) -> mpsc::Sender<Envelope> {
        let mut tx_guard = self.command_tx.lock().await;
        if let Some(ref tx) = *tx_guard {
            return tx.clone();
        }

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(view_actor(rx, Arc::clone(&self.data)));
        *tx_guard = Some(tx.clone());
        info!("View state actor spawned");
        tx
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the mutable view data and applies commands one at a time.
async fn view_actor(mut command_rx: mpsc::Receiver<Envelope>, data: Arc<RwLock<ViewData>>) {
    info!("View state actor started");

    while let Some(Envelope { command, applied }) = command_rx.recv().await {
        let mut data_write = data.write().await;

        match command {
            ViewCommand::SignedIn(username) => {
                if let Some(ref previous) = data_write.username {
                    warn!("Replacing signed-in user {} with {}", previous, username);
                    data_write.secrets.clear();
                } else {
                    info!("Signed in as {}", username);
                }
                data_write.username = Some(username);
            }
            ViewCommand::SignedOut => {
                if data_write.username.is_none() {
                    warn!("Sign-out applied but no user was signed in");
                }
                *data_write = ViewData::default();
                info!("Signed out");
            }
            ViewCommand::SecretsLoaded(secrets) => {
                debug!("Loaded {} secrets", secrets.len());
                data_write.secrets = secrets;
            }
            ViewCommand::SecretRemoved(id) => {
                let before = data_write.secrets.len();
                data_write.secrets.retain(|secret| secret.id != id);
                if data_write.secrets.len() == before {
                    debug!("Removed secret {} was not in the current snapshot", id);
                }
            }
        }

        drop(data_write);
        let _ = applied.send(());
    }

    warn!("View state actor stopped");
}
