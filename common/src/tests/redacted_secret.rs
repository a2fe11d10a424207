use crate::RedactedSecret;

/// **VALUE**: Verifies that Debug and Display never print the secret.
///
/// **WHY THIS MATTERS**: Operations are logged with `{:?}` at debug level. A password
/// or ciphertext leaking into `passguard.log` defeats the native module's encryption.
///
/// **BUG THIS CATCHES**: Would catch if someone derives Debug instead of the manual impl.
#[test]
fn given_secret_when_formatted_then_value_is_redacted() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("hunter2");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{:?}", secret);
    let display = format!("{}", secret);

    // THEN: Neither contains the value
    assert!(!debug.contains("hunter2"), "Debug leaked secret: {debug}");
    assert!(!display.contains("hunter2"), "Display leaked secret: {display}");
    assert_eq!(secret.expose(), "hunter2");
    assert_eq!(secret.len(), 7);
}

/// **VALUE**: Verifies that serializing a secret fails instead of emitting it.
///
/// **WHY THIS MATTERS**: Bridge replies are serialized with serde_json. A secret that
/// slipped into a reply type must fail loudly rather than travel over the socket.
///
/// **BUG THIS CATCHES**: Would catch if someone adds `#[derive(Serialize)]`.
#[test]
fn given_secret_when_serialized_then_returns_error() {
    // GIVEN: A secret
    let secret = RedactedSecret::from("ciphertext");

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&secret);

    // THEN: Serialization fails with the redaction message
    let err = result.expect_err("RedactedSecret must not serialize");
    assert!(err.to_string().contains("cannot be serialized"));
}
