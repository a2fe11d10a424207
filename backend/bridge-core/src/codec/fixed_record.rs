use crate::codec::{Codec, CodecKind, Request, WireRequest};
use crate::error::codec::CodecError;

use common::ErrorLocation;

use std::ffi::{CStr, CString, c_char};
use std::panic::Location;

use zeroize::{ZeroizeOnDrop, Zeroizing};

/// Number of parameter slots in the record.
pub const FIXED_RECORD_SLOTS: usize = 2;

/// C layout of the record passed by pointer to the native entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawParameters {
    pub method_name: *const c_char,
    pub param1: *const c_char,
    pub param2: *const c_char,
}

/// Owned strings behind a [`RawParameters`].
#[derive(Clone, PartialEq, Eq)]
pub struct FixedRecord {
    method_name: Zeroizing<CString>,
    param1: Zeroizing<CString>,
    param2: Zeroizing<CString>,
}

impl ZeroizeOnDrop for FixedRecord {}

impl FixedRecord {
    pub fn method_name(&self) -> &CStr {
        &self.method_name
    }

    pub fn param1(&self) -> &CStr {
        &self.param1
    }

    pub fn param2(&self) -> &CStr {
        &self.param2
    }

    /// Borrowing view; must not outlive `self`.
    pub fn as_raw(&self) -> RawParameters {
        RawParameters {
            method_name: self.method_name.as_ptr(),
            param1: self.param1.as_ptr(),
            param2: self.param2.as_ptr(),
        }
    }
}

/// Method name plus exactly two nullable parameter slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRecordCodec;

impl Codec for FixedRecordCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::FixedRecord
    }

    fn encode(&self, request: &Request) -> Result<WireRequest, CodecError> {
        if request.params.len() > FIXED_RECORD_SLOTS {
            return Err(CodecError::TooManyParams {
                method: request.method.to_string(),
                count: request.params.len(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let slot = |index: usize| request.params.get(index).map(String::as_str).unwrap_or("");

        Ok(WireRequest::Record(FixedRecord {
            method_name: to_c_string("method_name", request.method.as_str())?,
            param1: to_c_string("param1", slot(0))?,
            param2: to_c_string("param2", slot(1))?,
        }))
    }
}

#[track_caller]
fn to_c_string(field: &'static str, value: &str) -> Result<Zeroizing<CString>, CodecError> {
    CString::new(value).map(Zeroizing::new).map_err(|_| CodecError::InteriorNul {
        field,
        location: ErrorLocation::from(Location::caller()),
    })
}
