//! Per-connection authentication state.

/// Tracks whether a connection presented the expected token.
pub(crate) struct ConnectionState {
    authenticated: bool,
    expected_token: String,
}

impl ConnectionState {
    pub(crate) fn new(token: String) -> Self {
        Self {
            authenticated: false,
            expected_token: token,
        }
    }

    /// Returns true and marks the connection authenticated if `token` matches.
    pub(crate) fn validate_token(&mut self, token: &str) -> bool {
        if token == self.expected_token {
            self.authenticated = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
