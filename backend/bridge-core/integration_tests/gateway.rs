use crate::stub_native::{
    gateway, max_in_flight, null_pointer_entrypoint, overlap_probe_entrypoint, true_entrypoint,
};

use bridge_core::codec::{Codec, JsonEnvelopeCodec, MethodName, Request};
use bridge_core::error::gateway::GatewayError;
use bridge_core::gateway::{LibraryPlatform, LibrarySource, NativeGateway, library_path};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

fn signout_wire() -> bridge_core::codec::WireRequest {
    JsonEnvelopeCodec
        .encode(&Request::new(MethodName::Signout, Vec::new()))
        .expect("encode should succeed")
}

/// **VALUE**: Verifies a missing library is reported as a load error.
///
/// **WHY THIS MATTERS**: Startup calls `ensure_loaded` and aborts on a load error.
/// If it were reported as something else, the app would start and fail every call.
///
/// **BUG THIS CATCHES**: Would catch the loader error being swallowed or mapped to
/// a call failure.
#[test]
fn given_missing_library_when_ensure_loaded_then_returns_library_not_found() {
    // GIVEN: A path that does not exist
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("libdoes_not_exist.so");
    let gateway = NativeGateway::new(LibrarySource::Path(path.clone()));

    // WHEN: Loading
    let result = gateway.ensure_loaded();

    // THEN: LibraryNotFound with the path, and nothing is bound
    match result {
        Err(ref e @ GatewayError::LibraryNotFound { path: ref reported, .. }) => {
            assert_eq!(reported, &path);
            assert!(e.is_load_error());
        }
        other => panic!("Expected LibraryNotFound, got {other:?}"),
    }
    assert!(!gateway.is_loaded());
}

/// **VALUE**: Verifies construction performs no I/O and loading happens once.
///
/// **WHY THIS MATTERS**: The gateway is built before config errors are reported.
/// Binding twice would reload the library and lose its state.
///
/// **BUG THIS CATCHES**: Would catch eager loading in `new` or a non-idempotent bind.
#[test]
fn given_in_process_entrypoint_when_loaded_twice_then_binds_once() {
    // GIVEN: A gateway over an in-process entry point
    let gateway = gateway(true_entrypoint);
    assert!(!gateway.is_loaded(), "new() must not bind");

    // WHEN: Loading twice
    gateway.ensure_loaded().expect("first load");
    gateway.ensure_loaded().expect("second load");

    // THEN: Bound
    assert!(gateway.is_loaded());
}

/// **VALUE**: Verifies the first call binds lazily.
///
/// **WHY THIS MATTERS**: Callers that skip `ensure_loaded` must still work.
///
/// **BUG THIS CATCHES**: Would catch `call` requiring an explicit load first.
#[test]
fn given_unloaded_gateway_when_called_then_loads_and_returns_reply() {
    // GIVEN: An unloaded gateway
    let gateway = gateway(true_entrypoint);

    // WHEN: Calling directly
    let reply = gateway.call(&signout_wire()).expect("call should succeed");

    // THEN: Reply bytes and a bound gateway
    assert_eq!(reply, b"true");
    assert!(gateway.is_loaded());
}

/// **VALUE**: Verifies a null reply pointer is an error, not a crash.
///
/// **WHY THIS MATTERS**: Reading a null C string is undefined behaviour.
///
/// **BUG THIS CATCHES**: Would catch a missing null check before `CStr::from_ptr`.
#[test]
fn given_entrypoint_returning_null_when_called_then_returns_null_reply() {
    // GIVEN: A stub that returns a null pointer
    let gateway = gateway(null_pointer_entrypoint);

    // WHEN: Calling
    let result = gateway.call(&signout_wire());

    // THEN: NullReply
    assert!(matches!(result, Err(GatewayError::NullReply { .. })));
}

/// **VALUE**: Verifies concurrent callers never overlap inside the native module.
///
/// **WHY THIS MATTERS**: The native module is not documented as reentrant. Two
/// simultaneous calls could corrupt its account state.
///
/// **BUG THIS CATCHES**: Would catch the call lock being dropped before the native call.
#[test]
fn given_many_threads_when_calling_concurrently_then_calls_are_serialized() {
    // GIVEN: One shared gateway
    let gateway = gateway(overlap_probe_entrypoint);

    // WHEN: Eight threads call at once
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            thread::spawn(move || gateway.call(&signout_wire()).expect("call should succeed"))
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread should not panic");
    }

    // THEN: Never more than one call inside the native module
    assert_eq!(max_in_flight(), 1);
}

/// **VALUE**: Verifies platform file naming and directory joining.
///
/// **WHY THIS MATTERS**: A wrong prefix or extension makes the loader fail with a
/// confusing "not found" on one platform only.
///
/// **BUG THIS CATCHES**: Would catch `lib` being added on Windows or dropped on Unix.
#[test]
fn given_library_name_when_resolving_path_then_platform_convention_applies() {
    // GIVEN/WHEN/THEN: Explicit platforms
    assert_eq!(LibraryPlatform::Unix.file_name("passguard_api"), "libpassguard_api.so");
    assert_eq!(LibraryPlatform::Windows.file_name("passguard_api"), "passguard_api.dll");

    // GIVEN/WHEN/THEN: Current platform with and without a directory
    let file_name = LibraryPlatform::current().file_name("passguard_api");
    assert_eq!(library_path("passguard_api", None), PathBuf::from(&file_name));
    assert_eq!(
        library_path("passguard_api", Some(Path::new("/opt/passguard"))),
        Path::new("/opt/passguard").join(&file_name)
    );
}
