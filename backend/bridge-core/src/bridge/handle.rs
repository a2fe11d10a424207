//! Handle to a running bridge server.

use std::net::SocketAddr;

use tokio::task::JoinHandle;

/// Returned by [`start_bridge_server`](crate::bridge::start_bridge_server).
///
/// Dropping the handle does not stop the server; call [`shutdown`](Self::shutdown).
/// Connections already accepted keep running until their client disconnects.
pub struct BridgeServerHandle {
    local_addr: SocketAddr,
    auth_token: String,
    accept_task: JoinHandle<()>,
}

impl BridgeServerHandle {
    pub(crate) fn new(local_addr: SocketAddr, auth_token: String, accept_task: JoinHandle<()>) -> Self {
        Self {
            local_addr,
            auth_token,
            accept_task,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Token clients must present in their first frame.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Stop accepting new connections.
    pub fn shutdown(&self) {
        self.accept_task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.accept_task.is_finished()
    }
}
