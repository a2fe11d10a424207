// Unit tests for reply classification.
// The native module has three failure markers; everything else is a payload.

use crate::codec::Reply;
use crate::codec::reply::classify;

use serde_json::json;

/// **VALUE**: Verifies the three failure markers the native module emits.
///
/// **WHY THIS MATTERS**: Callers only look at the discriminant. If one marker is
/// classified as success, a failed sign-in is shown as signed in.
///
/// **BUG THIS CATCHES**: Would catch a classifier that only checks `false` and
/// forgets `null` or the `{"error": true}` object.
#[test]
fn given_failure_markers_when_classify_then_all_are_failures() {
    // GIVEN/WHEN/THEN: Each marker classifies as a failure
    assert_eq!(classify(json!(false)), Reply::Failure { message: None });
    assert_eq!(classify(json!(null)), Reply::Failure { message: None });
    assert_eq!(
        classify(json!({"error": true, "message": "Invalid credentials"})),
        Reply::Failure {
            message: Some(String::from("Invalid credentials"))
        }
    );
}

/// **VALUE**: Verifies falsy-looking payloads stay successes.
///
/// **WHY THIS MATTERS**: A user with no stored secrets gets `[]`. Treating that as a
/// failure would show an error instead of an empty list.
///
/// **BUG THIS CATCHES**: Would catch truthiness-based classification.
#[test]
fn given_falsy_payloads_when_classify_then_all_are_successes() {
    // GIVEN/WHEN/THEN: Empty list, empty string, zero and error:false are payloads
    assert!(classify(json!([])).is_success());
    assert!(classify(json!("")).is_success());
    assert!(classify(json!(0)).is_success());
    assert!(classify(json!({"error": false})).is_success());
    assert!(classify(json!({"error": "yes"})).is_success());
}

/// **VALUE**: Verifies a non-string error message is kept, not dropped.
///
/// **WHY THIS MATTERS**: The native module sometimes forwards a raw exception
/// object as `message`. Dropping it loses the only diagnostic.
///
/// **BUG THIS CATCHES**: Would catch `as_str()` returning None for objects.
#[test]
fn given_error_object_with_structured_message_when_classify_then_message_is_serialized() {
    // GIVEN: An error object with a structured message
    let value = json!({"error": true, "message": {"code": 7}});

    // WHEN: Classifying
    let reply = classify(value);

    // THEN: The message is the serialized object
    assert_eq!(
        reply,
        Reply::Failure {
            message: Some(String::from(r#"{"code":7}"#))
        }
    );
}
