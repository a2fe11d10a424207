use crate::stub_native::{
    ALICE, ALICE_PASSWORD, CIPHER_ONE, MISSING_ID, false_entrypoint, garbage_entrypoint, gateway,
    invalid_utf8_entrypoint, json_entrypoint, last_request, null_pointer_entrypoint,
    number_entrypoint, record_entrypoint,
};

use bridge_core::codec::CodecKind;
use bridge_core::dispatcher::{
    Dispatcher, FailureKind, Operation, Payload, Response, SecretRecord, Session,
};
use bridge_core::error::dispatch::DispatchError;
use bridge_core::gateway::{LibrarySource, NativeGateway, RawEntrypoint};

use std::sync::Arc;

fn dispatcher(entrypoint: RawEntrypoint, codec: CodecKind) -> Dispatcher {
    Dispatcher::new(gateway(entrypoint), codec.codec())
}

/// Both encodings, each paired with the stub that parses it.
fn deployments() -> [(Dispatcher, CodecKind); 2] {
    [
        (dispatcher(json_entrypoint, CodecKind::JsonEnvelope), CodecKind::JsonEnvelope),
        (dispatcher(record_entrypoint, CodecKind::FixedRecord), CodecKind::FixedRecord),
    ]
}

fn all_operations() -> Vec<Operation> {
    vec![
        Operation::Signin {
            username: ALICE.to_string(),
            password: ALICE_PASSWORD.into(),
        },
        Operation::CreateUser {
            username: String::from("bob"),
            password: "pw".into(),
        },
        Operation::Signout,
        Operation::Decrypt {
            ciphertext: CIPHER_ONE.into(),
        },
        Operation::GetPasswords,
        Operation::CreatePassword {
            url: String::from("https://example.net"),
            password: "cipher-3".into(),
        },
        Operation::DeletePassword {
            id: String::from("1"),
        },
        Operation::DeleteUser {
            username: String::from("bob"),
        },
    ]
}

fn stored_secrets() -> Vec<SecretRecord> {
    vec![
        SecretRecord {
            id: String::from("1"),
            url: String::from("https://example.com"),
            password: String::from("cipher-1"),
        },
        SecretRecord {
            id: String::from("2"),
            url: String::from("https://example.org"),
            password: String::from("cipher-2"),
        },
    ]
}

/// **VALUE**: Verifies every operation round-trips through both encodings to the
/// stub's canned reply.
///
/// **WHY THIS MATTERS**: This is the whole contract with the native module. Each
/// method has its own reply shape; one wrong mapping breaks one screen.
///
/// **BUG THIS CATCHES**: Would catch a method sent under the wrong wire name, params
/// in the wrong order, or a payload decoded with the wrong shape.
#[test]
fn given_stub_native_when_dispatching_every_operation_then_response_matches_canned_reply() {
    let expected = [
        Response::success(Payload::Session(Session {
            username: Some(ALICE.to_string()),
        })),
        Response::success(Payload::Session(Session::default())),
        Response::success(Payload::BooleanAck(true)),
        Response::success(Payload::PlaintextSecret(String::from("hunter2"))),
        Response::success(Payload::SecretList(stored_secrets())),
        Response::success(Payload::BooleanAck(true)),
        Response::success(Payload::BooleanAck(true)),
        Response::success(Payload::BooleanAck(true)),
    ];

    for (dispatcher, kind) in deployments() {
        // GIVEN: A dispatcher for one encoding
        assert_eq!(dispatcher.codec_kind(), kind);

        for (operation, expected) in all_operations().iter().zip(expected.iter()) {
            // WHEN: Dispatching the operation
            let response = dispatcher.dispatch(operation);

            // THEN: The stub's canned reply, typed
            assert_eq!(&response, expected, "{} via {}", operation.method(), kind);
        }
    }
}

/// **VALUE**: Verifies the stub saw the wire name and params in documented order.
///
/// **WHY THIS MATTERS**: signin is `[username, password]`; createPassword is
/// `[url, password]`. The native module trusts positions.
///
/// **BUG THIS CATCHES**: Would catch params swapped during lowering.
#[test]
fn given_create_password_when_dispatched_then_native_receives_url_then_password() {
    // GIVEN: A JSON deployment
    let dispatcher = dispatcher(json_entrypoint, CodecKind::JsonEnvelope);

    // WHEN: Creating a secret
    let response = dispatcher.create_password("https://example.net", "cipher-3");

    // THEN: Success, and params arrived in order
    assert!(response.is_success());
    assert_eq!(
        last_request(),
        Some((
            String::from("createPassword"),
            vec![String::from("https://example.net"), String::from("cipher-3")]
        ))
    );
}

/// **VALUE**: Verifies listing twice returns the same ordered list.
///
/// **WHY THIS MATTERS**: The list view refreshes after every change. Reordering
/// between refreshes makes rows jump under the cursor.
///
/// **BUG THIS CATCHES**: Would catch records collected into an unordered map.
#[test]
fn given_no_mutations_when_listing_twice_then_same_ordered_records() {
    for (dispatcher, _) in deployments() {
        // GIVEN/WHEN: Two consecutive listings
        let first = dispatcher.get_passwords();
        let second = dispatcher.get_passwords();

        // THEN: Identical and in native order
        assert_eq!(first, second);
        assert_eq!(
            first.payload(),
            Some(&Payload::SecretList(stored_secrets()))
        );
    }
}

/// **VALUE**: Verifies signout with no params reaches the native module as signout.
///
/// **WHY THIS MATTERS**: Zero-param calls are the edge case for the fixed record.
///
/// **BUG THIS CATCHES**: Would catch an encode error or a missing method name.
#[test]
fn given_signout_when_dispatched_then_stub_sees_signout_under_both_encodings() {
    // GIVEN: JSON deployment
    let json = dispatcher(json_entrypoint, CodecKind::JsonEnvelope);

    // WHEN: Signing out
    assert!(json.signout().is_success());

    // THEN: No params on the wire
    assert_eq!(last_request(), Some((String::from("signout"), Vec::new())));

    // GIVEN: Fixed record deployment
    let record = dispatcher(record_entrypoint, CodecKind::FixedRecord);

    // WHEN: Signing out
    assert!(record.signout().is_success());

    // THEN: Both slots present and empty
    assert_eq!(
        last_request(),
        Some((String::from("signout"), vec![String::new(), String::new()]))
    );
}

/// **VALUE**: Verifies a literal `false` reply is a call failure for every operation.
///
/// **WHY THIS MATTERS**: `false` is how the native module says "wrong password" or
/// "not found". Reading it as a boolean ack would report success.
///
/// **BUG THIS CATCHES**: Would catch ack methods accepting any boolean.
#[test]
fn given_native_returns_false_when_dispatching_any_operation_then_call_failure() {
    for codec in [CodecKind::JsonEnvelope, CodecKind::FixedRecord] {
        // GIVEN: A stub that always answers false
        let dispatcher = dispatcher(false_entrypoint, codec);

        for operation in all_operations() {
            // WHEN: Dispatching
            let response = dispatcher.dispatch(&operation);

            // THEN: A call failure, never a payload
            assert!(!response.is_success(), "{} via {}", operation.method(), codec);
            assert_eq!(response.failure_kind(), Some(FailureKind::Call));
        }
    }
}

/// **VALUE**: Verifies wrong credentials and unknown ids are call failures with messages.
///
/// **WHY THIS MATTERS**: The user must see why the action failed and be able to retry.
///
/// **BUG THIS CATCHES**: Would catch the error object's message being dropped.
#[test]
fn given_native_signals_logical_failure_when_dispatched_then_failure_carries_message() {
    // GIVEN: JSON deployment
    let dispatcher = dispatcher(json_entrypoint, CodecKind::JsonEnvelope);

    // WHEN: Wrong password, unknown id, undecryptable ciphertext
    let signin = dispatcher.signin(ALICE, "wrong");
    let delete = dispatcher.delete_password(MISSING_ID);
    let decrypt = dispatcher.decrypt("not-a-ciphertext");

    // THEN: Call failures; the error object's message survives
    assert_eq!(
        signin,
        Response::Failure {
            kind: FailureKind::Call,
            message: None
        }
    );
    assert_eq!(delete.failure_kind(), Some(FailureKind::Call));
    assert_eq!(
        decrypt,
        Response::Failure {
            kind: FailureKind::Call,
            message: Some(String::from("Unable to decrypt"))
        }
    );
}

/// **VALUE**: Verifies undecodable replies are protocol failures, distinct from call failures.
///
/// **WHY THIS MATTERS**: A protocol failure means the native module and this build
/// disagree on the contract; it must not look like a wrong password.
///
/// **BUG THIS CATCHES**: Would catch garbage coerced into `false`.
#[test]
fn given_garbage_or_invalid_utf8_reply_when_dispatched_then_protocol_failure() {
    for entrypoint in [garbage_entrypoint as RawEntrypoint, invalid_utf8_entrypoint] {
        // GIVEN: A stub returning undecodable bytes
        let dispatcher = dispatcher(entrypoint, CodecKind::JsonEnvelope);

        // WHEN: Dispatching
        let response = dispatcher.get_passwords();

        // THEN: Protocol failure
        assert_eq!(response.failure_kind(), Some(FailureKind::Protocol));
    }
}

/// **VALUE**: Verifies a well-formed reply of the wrong shape is a protocol failure.
///
/// **WHY THIS MATTERS**: `42` is valid JSON and not a failure marker, but it is not
/// a session, an ack, a plaintext or a list.
///
/// **BUG THIS CATCHES**: Would catch wrong-shape payloads passing as success.
#[test]
fn given_number_reply_when_dispatching_any_operation_then_protocol_failure() {
    // GIVEN: A stub that answers 42
    let dispatcher = dispatcher(number_entrypoint, CodecKind::FixedRecord);

    for operation in all_operations() {
        // WHEN: Dispatching
        let result = dispatcher.try_dispatch(&operation);

        // THEN: Protocol error from try_dispatch, protocol failure from dispatch
        assert!(
            matches!(result, Err(DispatchError::Protocol { .. })),
            "{}",
            operation.method()
        );
        assert_eq!(
            dispatcher.dispatch(&operation).failure_kind(),
            Some(FailureKind::Protocol)
        );
    }
}

/// **VALUE**: Verifies gateway failures come back as responses, never panics.
///
/// **WHY THIS MATTERS**: The responder answers on the reply channel no matter what.
/// A panic there would leave the caller waiting forever.
///
/// **BUG THIS CATCHES**: Would catch `dispatch` propagating gateway errors.
#[test]
fn given_gateway_failures_when_dispatched_then_gateway_failure_response() {
    // GIVEN: A null-returning stub and a missing library
    let null_reply = dispatcher(null_pointer_entrypoint, CodecKind::JsonEnvelope);
    let missing = Dispatcher::new(
        Arc::new(NativeGateway::new(LibrarySource::Path(
            "/nonexistent/libpassguard_api.so".into(),
        ))),
        CodecKind::JsonEnvelope.codec(),
    );

    // WHEN/THEN: Both fold into Gateway failures
    assert_eq!(null_reply.signout().failure_kind(), Some(FailureKind::Gateway));
    assert_eq!(missing.signout().failure_kind(), Some(FailureKind::Gateway));
    assert!(matches!(
        missing.try_dispatch(&Operation::Signout),
        Err(DispatchError::Gateway(ref e)) if e.is_load_error()
    ));
}

/// **VALUE**: Verifies a NUL byte in a password is refused before the native call.
///
/// **WHY THIS MATTERS**: The fixed record would otherwise truncate the password.
///
/// **BUG THIS CATCHES**: Would catch encode errors reported as gateway failures.
#[test]
fn given_password_with_nul_when_dispatched_via_fixed_record_then_invalid_request() {
    // GIVEN: Fixed record deployment
    let dispatcher = dispatcher(record_entrypoint, CodecKind::FixedRecord);

    // WHEN: Signing in with a NUL in the password
    let response = dispatcher.signin(ALICE, "correct\0horse");

    // THEN: InvalidRequest
    assert_eq!(response.failure_kind(), Some(FailureKind::InvalidRequest));
}
