use bridge_core::error::CoreError;
use bridge_core::error::bridge::BridgeError;
use bridge_core::error::gateway::GatewayError;

use common::ErrorLocation;

use std::panic::Location;

fn parse_envelope(text: &str) -> Result<serde_json::Value, BridgeError> {
    let value = serde_json::from_str(text)?;
    Ok(value)
}

/// **VALUE**: Verifies `?` conversions record the line of the `?`, not of the From impl.
///
/// **WHY THIS MATTERS**: A location pointing into `error/bridge.rs` for every
/// envelope error is useless when reading `passguard.log`.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being removed from a From impl.
#[test]
fn given_question_mark_conversion_when_error_created_then_location_is_call_site() {
    // GIVEN: The line of the `?` in parse_envelope
    let expected_line = line!() - 13;

    // WHEN: Parsing garbage
    let err = parse_envelope("{").expect_err("garbage should not parse");

    // THEN: The location is in this file at the `?`
    match err {
        BridgeError::Envelope { location, .. } => {
            assert!(location.file.contains("error.rs"), "file: {}", location.file);
            assert_eq!(location.line, expected_line);
        }
        other => panic!("Expected Envelope, got {other:?}"),
    }
}

/// **VALUE**: Verifies error text carries the kind, the message and the location suffix.
///
/// **WHY THIS MATTERS**: Startup prints load errors verbatim; the user needs the path.
///
/// **BUG THIS CATCHES**: Would catch CoreError wrapping changing the message.
#[test]
fn given_load_error_when_wrapped_in_core_error_then_display_is_transparent() {
    // GIVEN: A load error
    let location = ErrorLocation::from(Location::caller());
    let gateway = GatewayError::LibraryNotFound {
        path: "/opt/libpassguard_api.so".into(),
        message: String::from("cannot open shared object file"),
        location,
    };
    let direct = gateway.to_string();

    // WHEN: Wrapping
    let core = CoreError::from(gateway);

    // THEN: Same text, with path, message and location
    assert_eq!(core.to_string(), direct);
    assert!(direct.starts_with("Library Load Error: /opt/libpassguard_api.so"));
    assert!(direct.contains("cannot open shared object file"));
    assert!(direct.ends_with(&location.to_string()));
}
