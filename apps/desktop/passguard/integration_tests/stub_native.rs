//! Minimal in-process native module with one account, a session and a mutable store.

use bridge_core::bridge::{BridgeServerHandle, Responder, start_bridge_server};
use bridge_core::codec::CodecKind;
use bridge_core::dispatcher::Dispatcher;
use bridge_core::gateway::{LibrarySource, NativeGateway};

use std::ffi::{CStr, CString, c_char, c_void};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

pub const TEST_AUTH_TOKEN: &str = "test-token-12345";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct horse";

struct Store {
    next_id: u32,
    session: Option<String>,
    secrets: Vec<Value>,
}

static STORE: Mutex<Option<Store>> = Mutex::new(None);

fn handle(method: &str, params: &[String]) -> Value {
    let mut guard = STORE.lock().unwrap_or_else(|p| p.into_inner());
    let store = guard.get_or_insert_with(|| Store {
        next_id: 1,
        session: None,
        secrets: Vec::new(),
    });

    // signin drops the current session before checking credentials.
    if method == "signin" {
        store.session = None;
        if params == [USERNAME, PASSWORD] {
            store.session = Some(String::from(USERNAME));
            return json!({"username": USERNAME});
        }
        return json!({"error": true, "message": "NotAuthorized"});
    }

    if method == "createUser" {
        store.session = params.first().cloned();
        return json!({"username": params.first()});
    }

    if store.session.is_none() {
        return json!({"error": true, "message": "NotAuthorized"});
    }

    match method {
        "signout" | "deleteUser" => {
            store.session = None;
            json!(true)
        }
        "getPasswords" => Value::Array(store.secrets.clone()),
        "createPassword" => {
            let id = store.next_id.to_string();
            store.next_id += 1;
            store.secrets.push(json!({
                "id": id,
                "url": params.first().cloned().unwrap_or_default(),
                "password": format!("enc:{}", params.get(1).cloned().unwrap_or_default()),
            }));
            json!(true)
        }
        "deletePassword" => {
            let before = store.secrets.len();
            store
                .secrets
                .retain(|secret| secret["id"].as_str() != params.first().map(String::as_str));
            json!(store.secrets.len() < before)
        }
        "decrypt" => match params.first().and_then(|c| c.strip_prefix("enc:")) {
            Some(plaintext) => json!(plaintext),
            None => json!({"error": true, "message": "Unable to decrypt"}),
        },
        _ => Value::Null,
    }
}

unsafe extern "C" fn entrypoint(request: *const c_void) -> *const c_char {
    let text = unsafe { CStr::from_ptr(request.cast::<c_char>()) };
    let envelope: Value = serde_json::from_slice(text.to_bytes()).unwrap_or(Value::Null);
    let method = envelope["method"].as_str().unwrap_or_default().to_string();
    let params: Vec<String> = envelope["params"]
        .as_array()
        .map(|p| p.iter().map(|v| v.as_str().unwrap_or_default().to_string()).collect())
        .unwrap_or_default();

    let reply = handle(&method, &params).to_string();

    // Never freed; the gateway copies replies out.
    CString::new(reply).unwrap_or_default().into_raw()
}

fn reset_store() {
    *STORE.lock().unwrap_or_else(|p| p.into_inner()) = None;
}

/// Bridge server in front of a fresh stub store.
///
/// The store is process-wide; tests using it must be `#[serial]`.
pub async fn start_stub_bridge() -> BridgeServerHandle {
    reset_store();

    let gateway = Arc::new(NativeGateway::new(LibrarySource::Entrypoint(entrypoint)));
    let dispatcher = Dispatcher::new(gateway, CodecKind::JsonEnvelope.codec());

    start_bridge_server(
        0,
        Some(String::from(TEST_AUTH_TOKEN)),
        Responder::new(Arc::new(dispatcher)),
    )
    .await
    .expect("Failed to start bridge server")
}
