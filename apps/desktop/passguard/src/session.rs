//! View-facing adapter over the bridge.
//!
//! Each method issues one named request, waits for its own reply, updates
//! [`ViewState`] only when the reply is a success, and hands the reply back.
//! Listings are snapshots: after adding or removing a secret, call
//! [`SessionAdapter::refresh_secrets`] for a fresh one.

use crate::error::PassguardError;
use crate::state::{ViewCommand, ViewState};

use bridge_core::bridge::{BridgeClient, Channel};
use bridge_core::dispatcher::{FailureKind, Payload, Response};

use common::RedactedSecret;

use log::debug;
use serde_json::{Value, json};

pub struct SessionAdapter {
    client: BridgeClient,
    view: ViewState,
}

impl SessionAdapter {
    pub fn new(client: BridgeClient, view: ViewState) -> Self {
        Self { client, view }
    }

    /// Connect to the bridge and start with an empty view.
    pub async fn connect(port: u16, auth_token: &str) -> Result<Self, PassguardError> {
        let client = BridgeClient::connect(port, auth_token).await?;
        Ok(Self::new(client, ViewState::new()))
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    /// Sign in. The native module drops its current session before checking
    /// credentials, so a rejected sign-in also signs the view out.
    pub async fn signin(
        &self,
        username: &str,
        password: &RedactedSecret,
    ) -> Result<Response, PassguardError> {
        let payload = json!({"username": username, "password": password.expose()});
        let response = self.request(Channel::Signin, payload).await?;
        if response.failure_kind() == Some(FailureKind::Call) {
            self.view.update(ViewCommand::SignedOut).await?;
        } else {
            self.apply_session(username, &response).await?;
        }
        Ok(response)
    }

    /// Create an account; success also signs it in.
    pub async fn signup(
        &self,
        username: &str,
        password: &RedactedSecret,
    ) -> Result<Response, PassguardError> {
        let payload = json!({"username": username, "password": password.expose()});
        let response = self.request(Channel::Signup, payload).await?;
        self.apply_session(username, &response).await?;
        Ok(response)
    }

    pub async fn signout(&self) -> Result<Response, PassguardError> {
        let response = self.request(Channel::Signout, json!({})).await?;
        if response.is_success() {
            self.view.update(ViewCommand::SignedOut).await?;
        }
        Ok(response)
    }

    pub async fn refresh_secrets(&self) -> Result<Response, PassguardError> {
        let response = self.request(Channel::GetPasswords, json!({})).await?;
        if let Some(Payload::SecretList(secrets)) = response.payload() {
            self.view
                .update(ViewCommand::SecretsLoaded(secrets.clone()))
                .await?;
        }
        Ok(response)
    }

    /// Store a new secret. The current snapshot is left as is.
    pub async fn add_secret(
        &self,
        url: &str,
        password: &RedactedSecret,
    ) -> Result<Response, PassguardError> {
        let payload = json!({"url": url, "password": password.expose()});
        self.request(Channel::AddPassword, payload).await
    }

    pub async fn remove_secret(&self, id: &str) -> Result<Response, PassguardError> {
        let response = self
            .request(Channel::RemovePassword, json!({"id": id}))
            .await?;
        if response.is_success() {
            self.view
                .update(ViewCommand::SecretRemoved(id.to_string()))
                .await?;
        }
        Ok(response)
    }

    /// Decrypt one stored ciphertext. Plaintext is returned, never stored in the view.
    pub async fn reveal_secret(&self, ciphertext: &str) -> Result<Response, PassguardError> {
        self.request(Channel::DecryptPassword, json!({"password": ciphertext}))
            .await
    }

    /// Delete an account; success signs out.
    pub async fn remove_account(&self, username: &str) -> Result<Response, PassguardError> {
        let response = self
            .request(Channel::RemoveUser, json!({"username": username}))
            .await?;
        if response.is_success() {
            self.view.update(ViewCommand::SignedOut).await?;
        }
        Ok(response)
    }

    async fn request(&self, channel: Channel, payload: Value) -> Result<Response, PassguardError> {
        let response = self.client.call(channel, payload).await?;
        debug!(
            "{} answered {}",
            channel,
            if response.is_success() { "success" } else { "failure" }
        );
        Ok(response)
    }

    async fn apply_session(&self, username: &str, response: &Response) -> Result<(), PassguardError> {
        if let Some(Payload::Session(session)) = response.payload() {
            let username = session
                .username
                .clone()
                .unwrap_or_else(|| username.to_string());
            self.view.update(ViewCommand::SignedIn(username)).await?;
        }
        Ok(())
    }
}
