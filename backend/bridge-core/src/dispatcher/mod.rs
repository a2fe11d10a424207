//! Maps logical operations onto codec + gateway invocations.
//!
//! Every operation becomes one [`Request`](crate::codec::Request), one native
//! call and one decoded [`Response`]. [`Dispatcher::dispatch`] never fails:
//! call, protocol and gateway errors all come back as
//! [`Response::Failure`] with a distinguishing [`FailureKind`].

mod operation;
mod response;

pub use crate::codec::MethodName;
pub use operation::Operation;
pub use response::{FailureKind, Payload, Response, SecretRecord, Session, interpret};

use crate::codec::{Codec, CodecKind};
use crate::error::codec::CodecError;
use crate::error::dispatch::DispatchError;
use crate::gateway::NativeGateway;

use common::RedactedSecret;

use std::sync::Arc;

use log::{debug, warn};

pub struct Dispatcher {
    gateway: Arc<NativeGateway>,
    codec: Box<dyn Codec>,
}

impl Dispatcher {
    pub fn new(gateway: Arc<NativeGateway>, codec: Box<dyn Codec>) -> Self {
        Self { gateway, codec }
    }

    pub fn codec_kind(&self) -> CodecKind {
        self.codec.kind()
    }

    /// Encode, call, decode and interpret one operation.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Codec`] if the request cannot be encoded or the reply is not JSON
    /// - [`DispatchError::Gateway`] if the native module cannot be loaded or returns null
    /// - [`DispatchError::Protocol`] if the reply has the wrong shape for the method
    pub fn try_dispatch(&self, operation: &Operation) -> Result<Response, DispatchError> {
        let request = operation.to_request();
        debug!(
            "Dispatching {} ({} params) via {}",
            request.method,
            request.params.len(),
            self.codec.kind()
        );

        let wire = self.codec.encode(&request)?;
        let raw = self.gateway.call(&wire)?;
        let reply = self.codec.decode(&raw)?;
        interpret(request.method, reply)
    }

    /// Like [`try_dispatch`](Self::try_dispatch) with errors folded into a failure response.
    pub fn dispatch(&self, operation: &Operation) -> Response {
        match self.try_dispatch(operation) {
            Ok(response) => {
                if !response.is_success() {
                    debug!("{} returned a failure marker", operation.method());
                }
                response
            }
            Err(e) => {
                warn!("{} failed: {}", operation.method(), e);
                Response::failure(failure_kind(&e), e.to_string())
            }
        }
    }

    pub fn signin(&self, username: &str, password: impl Into<RedactedSecret>) -> Response {
        self.dispatch(&Operation::Signin {
            username: username.to_string(),
            password: password.into(),
        })
    }

    pub fn create_user(&self, username: &str, password: impl Into<RedactedSecret>) -> Response {
        self.dispatch(&Operation::CreateUser {
            username: username.to_string(),
            password: password.into(),
        })
    }

    pub fn signout(&self) -> Response {
        self.dispatch(&Operation::Signout)
    }

    pub fn decrypt(&self, ciphertext: impl Into<RedactedSecret>) -> Response {
        self.dispatch(&Operation::Decrypt {
            ciphertext: ciphertext.into(),
        })
    }

    pub fn get_passwords(&self) -> Response {
        self.dispatch(&Operation::GetPasswords)
    }

    pub fn create_password(&self, url: &str, password: impl Into<RedactedSecret>) -> Response {
        self.dispatch(&Operation::CreatePassword {
            url: url.to_string(),
            password: password.into(),
        })
    }

    pub fn delete_password(&self, id: &str) -> Response {
        self.dispatch(&Operation::DeletePassword { id: id.to_string() })
    }

    pub fn delete_user(&self, username: &str) -> Response {
        self.dispatch(&Operation::DeleteUser {
            username: username.to_string(),
        })
    }
}

pub(crate) fn failure_kind(error: &DispatchError) -> FailureKind {
    match error {
        DispatchError::Codec(CodecError::Decode { .. }) => FailureKind::Protocol,
        DispatchError::Codec(_) => FailureKind::InvalidRequest,
        DispatchError::Gateway(_) => FailureKind::Gateway,
        DispatchError::Protocol { .. } => FailureKind::Protocol,
    }
}
