use crate::codec::{MethodName, Request};

use common::RedactedSecret;

/// One logical call with typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Signin {
        username: String,
        password: RedactedSecret,
    },
    CreateUser {
        username: String,
        password: RedactedSecret,
    },
    Signout,
    Decrypt {
        ciphertext: RedactedSecret,
    },
    GetPasswords,
    CreatePassword {
        url: String,
        password: RedactedSecret,
    },
    DeletePassword {
        id: String,
    },
    DeleteUser {
        username: String,
    },
}

impl Operation {
    pub fn method(&self) -> MethodName {
        match self {
            Operation::Signin { .. } => MethodName::Signin,
            Operation::CreateUser { .. } => MethodName::CreateUser,
            Operation::Signout => MethodName::Signout,
            Operation::Decrypt { .. } => MethodName::Decrypt,
            Operation::GetPasswords => MethodName::GetPasswords,
            Operation::CreatePassword { .. } => MethodName::CreatePassword,
            Operation::DeletePassword { .. } => MethodName::DeletePassword,
            Operation::DeleteUser { .. } => MethodName::DeleteUser,
        }
    }

    /// Lower into a request with params in native order.
    pub fn to_request(&self) -> Request {
        let params = match self {
            Operation::Signin { username, password }
            | Operation::CreateUser { username, password } => {
                vec![username.clone(), password.expose().to_string()]
            }
            Operation::Signout | Operation::GetPasswords => Vec::new(),
            Operation::Decrypt { ciphertext } => vec![ciphertext.expose().to_string()],
            Operation::CreatePassword { url, password } => {
                vec![url.clone(), password.expose().to_string()]
            }
            Operation::DeletePassword { id } => vec![id.clone()],
            Operation::DeleteUser { username } => vec![username.clone()],
        };

        Request::new(self.method(), params)
    }
}
