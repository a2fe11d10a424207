use crate::error::codec::CodecError;

use common::ErrorLocation;

use std::ffi::{CString, c_void};
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use super::fixed_record::{FixedRecord, RawParameters};

use zeroize::{ZeroizeOnDrop, Zeroizing};

/// Closed set of methods the native entry point understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodName {
    Signin,
    CreateUser,
    Signout,
    Decrypt,
    GetPasswords,
    CreatePassword,
    DeletePassword,
    DeleteUser,
}

impl MethodName {
    pub const ALL: [MethodName; 8] = [
        MethodName::Signin,
        MethodName::CreateUser,
        MethodName::Signout,
        MethodName::Decrypt,
        MethodName::GetPasswords,
        MethodName::CreatePassword,
        MethodName::DeletePassword,
        MethodName::DeleteUser,
    ];

    /// Name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            MethodName::Signin => "signin",
            MethodName::CreateUser => "createUser",
            MethodName::Signout => "signout",
            MethodName::Decrypt => "decrypt",
            MethodName::GetPasswords => "getPasswords",
            MethodName::CreatePassword => "createPassword",
            MethodName::DeletePassword => "deletePassword",
            MethodName::DeleteUser => "deleteUser",
        }
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodName {
    type Err = CodecError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        MethodName::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| CodecError::Decode {
                message: format!("Unknown method name '{value}'"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// A logical call: method plus ordered string params.
///
/// Params are wiped when the request is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Request {
    pub method: MethodName,
    pub params: Zeroizing<Vec<String>>,
}

impl Request {
    pub fn new(method: MethodName, params: Vec<String>) -> Self {
        Self {
            method,
            params: Zeroizing::new(params),
        }
    }
}

impl ZeroizeOnDrop for Request {}

// Params carry passwords and ciphertext.
impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("params", &format_args!("[{} redacted]", self.params.len()))
            .finish()
    }
}

/// Owned, NUL-terminated request ready to hand to the native entry point.
///
/// Both variants wipe their bytes on drop.
pub enum WireRequest {
    Text(Zeroizing<CString>),
    Record(FixedRecord),
}

impl ZeroizeOnDrop for WireRequest {}

impl WireRequest {
    /// Runs `call` with the single pointer the native entry point expects.
    ///
    /// The pointer, and every string it reaches, stays valid until `call` returns.
    pub fn with_native_ptr<R>(&self, call: impl FnOnce(*const c_void) -> R) -> R {
        match self {
            WireRequest::Text(text) => call(text.as_ptr().cast()),
            WireRequest::Record(record) => {
                let raw: RawParameters = record.as_raw();
                call((&raw as *const RawParameters).cast())
            }
        }
    }
}

impl fmt::Debug for WireRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireRequest::Text(text) => write!(f, "WireRequest::Text({} bytes)", text.as_bytes().len()),
            WireRequest::Record(record) => write!(
                f,
                "WireRequest::Record(method_name={:?})",
                record.method_name()
            ),
        }
    }
}
