//! In-process stand-ins for the native module.
//!
//! Each stub has the `entrypoint` signature and is handed to the gateway as
//! `LibrarySource::Entrypoint`. Replies are static C strings, so the
//! returned pointers stay valid forever.

use bridge_core::codec::RawParameters;
use bridge_core::gateway::{LibrarySource, NativeGateway, RawEntrypoint};

use std::cell::RefCell;
use std::ffi::{CStr, c_char, c_void};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

pub const ALICE: &str = "alice";
pub const ALICE_PASSWORD: &str = "correct horse";
pub const CIPHER_ONE: &str = "cipher-1";
pub const CIPHER_TWO: &str = "cipher-2";
pub const CIPHER_SLOW: &str = "cipher-slow";
pub const MISSING_ID: &str = "missing";

thread_local! {
    /// Last request seen by a stub on this thread, as (method, params).
    static LAST_REQUEST: RefCell<Option<(String, Vec<String>)>> = const { RefCell::new(None) };
}

pub fn last_request() -> Option<(String, Vec<String>)> {
    LAST_REQUEST.with(|last| last.borrow().clone())
}

fn remember(method: &str, params: &[String]) {
    LAST_REQUEST.with(|last| *last.borrow_mut() = Some((method.to_string(), params.to_vec())));
}

/// Canned replies keyed on method and params.
fn route(method: &str, params: &[String]) -> &'static CStr {
    remember(method, params);

    let param = |index: usize| params.get(index).map(String::as_str).unwrap_or("");

    match method {
        "signin" if param(0) == ALICE && param(1) == ALICE_PASSWORD => c"{\"username\":\"alice\"}",
        "signin" => c"false",
        "createUser" if param(0).is_empty() => c"{\"error\":true,\"message\":\"Username required\"}",
        "createUser" => c"true",
        "signout" => c"true",
        "decrypt" if param(0) == CIPHER_ONE => c"\"hunter2\"",
        "decrypt" if param(0) == CIPHER_TWO => c"\"letmein\"",
        "decrypt" if param(0) == CIPHER_SLOW => {
            std::thread::sleep(Duration::from_millis(100));
            c"\"slow-plaintext\""
        }
        "decrypt" => c"{\"error\":true,\"message\":\"Unable to decrypt\"}",
        "getPasswords" => c"[{\"id\":\"1\",\"url\":\"https://example.com\",\"password\":\"cipher-1\",\"user_id\":7},{\"id\":\"2\",\"url\":\"https://example.org\",\"password\":\"cipher-2\",\"user_id\":7}]",
        "createPassword" => c"true",
        "deletePassword" if param(0) == MISSING_ID => c"false",
        "deletePassword" => c"true",
        "deleteUser" => c"true",
        _ => c"null",
    }
}

/// Speaks the JSON envelope encoding.
pub unsafe extern "C" fn json_entrypoint(request: *const c_void) -> *const c_char {
    let text = unsafe { CStr::from_ptr(request.cast::<c_char>()) };
    let Ok(envelope) = serde_json::from_slice::<Value>(text.to_bytes()) else {
        return c"null".as_ptr();
    };

    let method = envelope["method"].as_str().unwrap_or_default().to_string();
    let params: Vec<String> = envelope["params"]
        .as_array()
        .map(|params| {
            params
                .iter()
                .map(|p| p.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();

    route(&method, &params).as_ptr()
}

/// Speaks the fixed record encoding. Records always carry both slots.
pub unsafe extern "C" fn record_entrypoint(request: *const c_void) -> *const c_char {
    let raw = unsafe { &*request.cast::<RawParameters>() };
    let read = |ptr: *const c_char| {
        unsafe { CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned()
    };

    let method = read(raw.method_name);
    let params = vec![read(raw.param1), read(raw.param2)];

    route(&method, &params).as_ptr()
}

pub unsafe extern "C" fn true_entrypoint(_request: *const c_void) -> *const c_char {
    c"true".as_ptr()
}

pub unsafe extern "C" fn false_entrypoint(_request: *const c_void) -> *const c_char {
    c"false".as_ptr()
}

pub unsafe extern "C" fn null_pointer_entrypoint(_request: *const c_void) -> *const c_char {
    std::ptr::null()
}

pub unsafe extern "C" fn garbage_entrypoint(_request: *const c_void) -> *const c_char {
    c"<html>not json</html>".as_ptr()
}

static INVALID_UTF8: [u8; 3] = [0xff, 0xfe, 0x00];

pub unsafe extern "C" fn invalid_utf8_entrypoint(_request: *const c_void) -> *const c_char {
    INVALID_UTF8.as_ptr().cast()
}

pub unsafe extern "C" fn number_entrypoint(_request: *const c_void) -> *const c_char {
    c"42".as_ptr()
}

static IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);
static MAX_IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);

/// Records how many calls were inside the native module at once.
///
/// Counters are process-wide; only one test may use this stub.
pub unsafe extern "C" fn overlap_probe_entrypoint(_request: *const c_void) -> *const c_char {
    let now = IN_FLIGHT.fetch_add(1, Ordering::SeqCst) + 1;
    MAX_IN_FLIGHT.fetch_max(now, Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(20));
    IN_FLIGHT.fetch_sub(1, Ordering::SeqCst);
    c"true".as_ptr()
}

pub fn max_in_flight() -> usize {
    MAX_IN_FLIGHT.load(Ordering::SeqCst)
}

pub fn gateway(entrypoint: RawEntrypoint) -> Arc<NativeGateway> {
    Arc::new(NativeGateway::new(LibrarySource::Entrypoint(entrypoint)))
}
