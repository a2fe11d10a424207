// Unit tests for error module
// Startup errors are reported as JSON

use crate::error::PassguardError;

use bridge_core::error::gateway::GatewayError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Tests that errors serialize with type and data.
///
/// **WHY THIS MATTERS**: The UI process parses the startup failure to decide
/// between "install the native module" and "fix your config".
///
/// **BUG THIS CATCHES**: Would catch a removed `#[derive(Serialize)]` or a changed tag.
#[test]
fn given_passguard_error_when_serialized_then_tagged_json() {
    // GIVEN: A config error
    let err = PassguardError::Config {
        message: String::from("Test"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Serializing to JSON
    let value = serde_json::to_value(&err).expect("Error should be serializable");

    // THEN: Tagged variant with the message
    assert_eq!(value["type"], "Config");
    assert_eq!(value["data"]["message"], "Test");
}

/// **VALUE**: Verifies gateway failures become Load errors.
///
/// **WHY THIS MATTERS**: Load errors abort startup; anything else would let the
/// process start without a native module.
///
/// **BUG THIS CATCHES**: Would catch the From impl mapping to the wrong variant.
#[test]
fn given_gateway_error_when_converted_then_load_variant_keeps_message() {
    // GIVEN: A missing library
    let gateway = GatewayError::LibraryNotFound {
        path: "/missing/libpassguard_api.so".into(),
        message: String::from("No such file"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Converting
    let err = PassguardError::from(gateway);

    // THEN: Load with the original text
    match err {
        PassguardError::Load { message, .. } => {
            assert!(message.contains("/missing/libpassguard_api.so"));
            assert!(message.contains("No such file"));
        }
        other => panic!("Expected Load, got {other:?}"),
    }
}
