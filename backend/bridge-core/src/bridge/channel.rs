use crate::RESPONSE_CHANNEL_SUFFIX;
use crate::codec::MethodName;
use crate::dispatcher::Operation;
use crate::error::bridge::BridgeError;

use common::{ErrorLocation, RedactedSecret};

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Request channel names exposed to the UI process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Signin,
    Signup,
    Signout,
    DecryptPassword,
    GetPasswords,
    AddPassword,
    RemovePassword,
    RemoveUser,
}

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::Signin,
        Channel::Signup,
        Channel::Signout,
        Channel::DecryptPassword,
        Channel::GetPasswords,
        Channel::AddPassword,
        Channel::RemovePassword,
        Channel::RemoveUser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Signin => "signin",
            Channel::Signup => "signup",
            Channel::Signout => "signout",
            Channel::DecryptPassword => "decrypt-password",
            Channel::GetPasswords => "get-passwords",
            Channel::AddPassword => "add-password",
            Channel::RemovePassword => "remove-password",
            Channel::RemoveUser => "remove-user",
        }
    }

    pub fn response_name(self) -> String {
        response_channel_name(self.name())
    }

    pub fn method(self) -> MethodName {
        match self {
            Channel::Signin => MethodName::Signin,
            Channel::Signup => MethodName::CreateUser,
            Channel::Signout => MethodName::Signout,
            Channel::DecryptPassword => MethodName::Decrypt,
            Channel::GetPasswords => MethodName::GetPasswords,
            Channel::AddPassword => MethodName::CreatePassword,
            Channel::RemovePassword => MethodName::DeletePassword,
            Channel::RemoveUser => MethodName::DeleteUser,
        }
    }

    /// Build the operation for this channel from the UI payload.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidPayload`] if a required field is missing
    /// or has the wrong type. Nothing is defaulted.
    pub fn operation(self, payload: Value) -> Result<Operation, BridgeError> {
        let operation = match self {
            Channel::Signin => {
                let Credentials { username, password } = self.parse(payload)?;
                Operation::Signin {
                    username,
                    password: password.into(),
                }
            }
            Channel::Signup => {
                let Credentials { username, password } = self.parse(payload)?;
                Operation::CreateUser {
                    username,
                    password: password.into(),
                }
            }
            Channel::Signout => Operation::Signout,
            Channel::DecryptPassword => {
                let CiphertextPayload { password } = self.parse(payload)?;
                Operation::Decrypt {
                    ciphertext: RedactedSecret::from(password),
                }
            }
            Channel::GetPasswords => Operation::GetPasswords,
            Channel::AddPassword => {
                let NewSecretPayload { url, password } = self.parse(payload)?;
                Operation::CreatePassword {
                    url,
                    password: password.into(),
                }
            }
            Channel::RemovePassword => {
                let SecretIdPayload { id } = self.parse(payload)?;
                Operation::DeletePassword { id }
            }
            Channel::RemoveUser => {
                let UsernamePayload { username } = self.parse(payload)?;
                Operation::DeleteUser { username }
            }
        };

        Ok(operation)
    }

    #[track_caller]
    fn parse<T: DeserializeOwned>(self, payload: Value) -> Result<T, BridgeError> {
        serde_json::from_value(payload).map_err(|e| BridgeError::InvalidPayload {
            channel: self.name().to_string(),
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = BridgeError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.name() == value)
            .ok_or_else(|| BridgeError::UnknownChannel {
                channel: value.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// `<name>-response`
pub fn response_channel_name(request_channel: &str) -> String {
    format!("{request_channel}{RESPONSE_CHANNEL_SUFFIX}")
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct CiphertextPayload {
    password: String,
}

#[derive(Deserialize)]
struct NewSecretPayload {
    url: String,
    password: String,
}

#[derive(Deserialize)]
struct SecretIdPayload {
    id: String,
}

#[derive(Deserialize)]
struct UsernamePayload {
    username: String,
}
