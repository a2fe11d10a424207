use bridge_core::codec::{
    Codec, CodecKind, FixedRecordCodec, JsonEnvelopeCodec, MethodName, Reply, Request, WireRequest,
};
use bridge_core::error::codec::CodecError;

use serde_json::{Value, json};
use zeroize::{Zeroize, ZeroizeOnDrop};

fn request(method: MethodName, params: &[&str]) -> Request {
    Request::new(method, params.iter().map(|p| p.to_string()).collect())
}

fn envelope_of(wire: &WireRequest) -> Value {
    match wire {
        WireRequest::Text(text) => {
            serde_json::from_slice(text.as_bytes()).expect("envelope should be JSON")
        }
        WireRequest::Record(_) => panic!("expected a JSON envelope"),
    }
}

/// **VALUE**: Verifies the fixed record fills unused slots with empty strings.
///
/// **WHY THIS MATTERS**: The native module reads both slots unconditionally. A null
/// pointer in `param2` would crash it on every one-parameter call.
///
/// **BUG THIS CATCHES**: Would catch omitted slots or slots shifted by one.
#[test]
fn given_decrypt_with_one_param_when_fixed_record_encodes_then_second_slot_is_empty() {
    // GIVEN: decrypt("abc")
    let request = request(MethodName::Decrypt, &["abc"]);

    // WHEN: Encoding with the fixed record codec
    let wire = FixedRecordCodec.encode(&request).expect("encode should succeed");

    // THEN: method, param1 and an empty param2
    let WireRequest::Record(record) = wire else {
        panic!("expected a record");
    };
    assert_eq!(record.method_name().to_str().unwrap(), "decrypt");
    assert_eq!(record.param1().to_str().unwrap(), "abc");
    assert_eq!(record.param2().to_str().unwrap(), "");
}

/// **VALUE**: Verifies a quoted string reply decodes to a success with that literal text.
///
/// **WHY THIS MATTERS**: This is how decrypt returns plaintext.
///
/// **BUG THIS CATCHES**: Would catch decode keeping the JSON quotes in the payload.
#[test]
fn given_plaintext_reply_when_decoded_then_success_carries_literal_string() {
    // GIVEN: The native reply "plaintext"
    let raw = br#""plaintext""#;

    // WHEN: Decoding with either codec
    let fixed = FixedRecordCodec.decode(raw).expect("decode should succeed");
    let json = JsonEnvelopeCodec.decode(raw).expect("decode should succeed");

    // THEN: Both are a success with the literal string
    assert_eq!(fixed, Reply::Success(json!("plaintext")));
    assert_eq!(json, fixed);
}

/// **VALUE**: Verifies zero-parameter methods encode under both codecs.
///
/// **WHY THIS MATTERS**: signout and getPasswords take no params. If encoding them
/// fails, the user can never sign out.
///
/// **BUG THIS CATCHES**: Would catch `params` being omitted from the envelope or
/// the record codec indexing into an empty list.
#[test]
fn given_signout_with_no_params_when_encoded_then_both_codecs_succeed() {
    // GIVEN: signout()
    let request = request(MethodName::Signout, &[]);

    // WHEN: Encoding with both codecs
    let json_wire = JsonEnvelopeCodec.encode(&request).expect("json encode");
    let record_wire = FixedRecordCodec.encode(&request).expect("record encode");

    // THEN: The envelope has an empty params array
    assert_eq!(
        envelope_of(&json_wire),
        json!({"method": "signout", "params": []})
    );

    // THEN: The record has both slots empty
    let WireRequest::Record(record) = record_wire else {
        panic!("expected a record");
    };
    assert_eq!(record.method_name().to_str().unwrap(), "signout");
    assert!(record.param1().to_bytes().is_empty());
    assert!(record.param2().to_bytes().is_empty());
}

/// **VALUE**: Verifies the JSON envelope keeps param order and accepts any count.
///
/// **WHY THIS MATTERS**: signin is `[username, password]`. Swapped params sign in
/// with the password as the username.
///
/// **BUG THIS CATCHES**: Would catch params being sorted or capped at two.
#[test]
fn given_three_params_when_json_envelope_encodes_then_all_are_kept_in_order() {
    // GIVEN: A request with three params
    let request = request(MethodName::CreatePassword, &["a", "b", "c"]);

    // WHEN: Encoding as JSON
    let wire = JsonEnvelopeCodec.encode(&request).expect("encode should succeed");

    // THEN: All three in order
    assert_eq!(envelope_of(&wire)["params"], json!(["a", "b", "c"]));
}

/// **VALUE**: Verifies the fixed record rejects more params than it has slots.
///
/// **WHY THIS MATTERS**: Silently dropping the third param would send a different
/// call than the caller asked for.
///
/// **BUG THIS CATCHES**: Would catch truncation instead of an error.
#[test]
fn given_three_params_when_fixed_record_encodes_then_returns_too_many_params() {
    // GIVEN: A request with three params
    let request = request(MethodName::CreatePassword, &["a", "b", "c"]);

    // WHEN: Encoding as a record
    let result = FixedRecordCodec.encode(&request);

    // THEN: TooManyParams with the count
    match result {
        Err(CodecError::TooManyParams { method, count, .. }) => {
            assert_eq!(method, "createPassword");
            assert_eq!(count, 3);
        }
        other => panic!("Expected TooManyParams, got {other:?}"),
    }
}

/// **VALUE**: Verifies a NUL byte in a param is rejected, not truncated.
///
/// **WHY THIS MATTERS**: C strings end at the first NUL. "pass\0word" would reach
/// the native module as "pass".
///
/// **BUG THIS CATCHES**: Would catch a lossy conversion to C strings.
#[test]
fn given_param_with_nul_byte_when_fixed_record_encodes_then_returns_interior_nul() {
    // GIVEN: A password containing NUL
    let request = request(MethodName::Signin, &["alice", "pass\0word"]);

    // WHEN: Encoding as a record
    let result = FixedRecordCodec.encode(&request);

    // THEN: InteriorNul naming the slot
    match result {
        Err(CodecError::InteriorNul { field, .. }) => assert_eq!(field, "param2"),
        other => panic!("Expected InteriorNul, got {other:?}"),
    }
}

/// **VALUE**: Verifies the JSON envelope carries NUL bytes escaped and UTF-8 intact.
///
/// **WHY THIS MATTERS**: Passwords may contain any Unicode. The envelope must
/// preserve it exactly, or the stored secret differs from what the user typed.
///
/// **BUG THIS CATCHES**: Would catch lossy or double encoding.
#[test]
fn given_unicode_and_nul_params_when_json_envelope_encodes_then_text_round_trips() {
    // GIVEN: Unicode and an embedded NUL
    let request = request(MethodName::Signin, &["zoë", "pässwörd ✓\0"]);

    // WHEN: Encoding as JSON
    let wire = JsonEnvelopeCodec.encode(&request).expect("encode should succeed");

    // THEN: The params parse back exactly
    assert_eq!(
        envelope_of(&wire)["params"],
        json!(["zoë", "pässwörd ✓\u{0}"])
    );
}

/// **VALUE**: Verifies undecodable replies are protocol errors.
///
/// **WHY THIS MATTERS**: Garbage must not be coerced into `false` and shown as
/// "wrong password".
///
/// **BUG THIS CATCHES**: Would catch decode falling back to `Reply::Failure`.
#[test]
fn given_invalid_reply_bytes_when_decoded_then_returns_decode_error() {
    // GIVEN: Invalid UTF-8 and invalid JSON
    let invalid_utf8: &[u8] = &[0xff, 0xfe];
    let invalid_json: &[u8] = b"{not json";

    // WHEN/THEN: Both are Decode errors
    assert!(matches!(
        JsonEnvelopeCodec.decode(invalid_utf8),
        Err(CodecError::Decode { .. })
    ));
    assert!(matches!(
        FixedRecordCodec.decode(invalid_json),
        Err(CodecError::Decode { .. })
    ));
}

/// **VALUE**: Verifies codec selection by name, as used in config and env overrides.
///
/// **WHY THIS MATTERS**: A typo in `PASSGUARD_CODEC` must fail startup, not pick a
/// default the native module cannot parse.
///
/// **BUG THIS CATCHES**: Would catch FromStr defaulting on unknown input.
#[test]
fn given_codec_names_when_parsed_then_kind_and_codec_match() {
    // GIVEN/WHEN: Known names and aliases
    let json: CodecKind = "json_envelope".parse().expect("known name");
    let record: CodecKind = "record".parse().expect("known alias");

    // THEN: Kinds and instantiated codecs agree
    assert_eq!(json, CodecKind::JsonEnvelope);
    assert_eq!(record, CodecKind::FixedRecord);
    assert_eq!(record.codec().kind(), CodecKind::FixedRecord);
    assert_eq!(CodecKind::default(), CodecKind::JsonEnvelope);
    assert_eq!(
        serde_json::to_value(CodecKind::FixedRecord).unwrap(),
        json!("fixed_record")
    );

    // THEN: Unknown names are rejected as an unknown codec, naming the input
    match "protobuf".parse::<CodecKind>() {
        Err(CodecError::UnknownCodec { name, .. }) => assert_eq!(name, "protobuf"),
        other => panic!("Expected UnknownCodec, got {other:?}"),
    }
}

/// **VALUE**: Verifies every method name parses back from its wire name.
///
/// **WHY THIS MATTERS**: The wire names are camelCase and fixed by the native module.
///
/// **BUG THIS CATCHES**: Would catch a renamed variant changing its wire name.
#[test]
fn given_all_methods_when_wire_name_parsed_then_same_method_returned() {
    for method in MethodName::ALL {
        let parsed: MethodName = method.as_str().parse().expect("wire name should parse");
        assert_eq!(parsed, method);
    }
    assert_eq!(MethodName::CreateUser.as_str(), "createUser");
    assert_eq!(MethodName::GetPasswords.as_str(), "getPasswords");
    assert!("getpasswords".parse::<MethodName>().is_err());
}

fn wiped_on_drop<T: ZeroizeOnDrop>(_: &T) {}

/// **VALUE**: Verifies passwords copied into requests and wire buffers are wiped.
///
/// **WHY THIS MATTERS**: Sign-in and add-secret passwords pass through both
/// types. Freed but unwiped buffers leave them readable in process memory.
///
/// **BUG THIS CATCHES**: Would catch params going back to plain `Vec<String>`
/// or wire buffers to plain `CString`.
#[test]
fn given_request_with_password_when_encoded_then_every_copy_wipes_itself() {
    // GIVEN: A sign-in request carrying a password
    let mut request = request(MethodName::Signin, &["alice", "hunter2"]);

    // WHEN: Encoding with both codecs
    let text = JsonEnvelopeCodec.encode(&request).expect("encode should succeed");
    let record = FixedRecordCodec.encode(&request).expect("encode should succeed");

    // THEN: Every holder wipes on drop
    wiped_on_drop(&request);
    wiped_on_drop(&text);
    wiped_on_drop(&record);

    // THEN: Wiping the params leaves nothing behind
    request.params.zeroize();
    assert!(request.params.is_empty());
}
