use crate::stub_native::{
    ALICE, ALICE_PASSWORD, CIPHER_ONE, CIPHER_SLOW, CIPHER_TWO, gateway, json_entrypoint,
};

use bridge_core::bridge::{
    BridgeClient, BridgeReply, BridgeRequest, Channel, ClientFrame, Delivery, PendingLedger,
    Responder, start_bridge_server,
};
use bridge_core::codec::{CodecKind, MethodName};
use bridge_core::dispatcher::{Dispatcher, FailureKind, Payload, Response, Session};
use bridge_core::error::bridge::BridgeError;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

const TEST_AUTH_TOKEN: &str = "test-token-12345";

fn responder() -> Responder {
    Responder::new(Arc::new(Dispatcher::new(
        gateway(json_entrypoint),
        CodecKind::JsonEnvelope.codec(),
    )))
}

fn plaintext(text: &str) -> Response {
    Response::success(Payload::PlaintextSecret(text.to_string()))
}

fn reply(request_id: u64, channel: &str, response: Response) -> BridgeReply {
    BridgeReply {
        request_id,
        channel: channel.to_string(),
        response,
    }
}

// ============================================
// CHANNELS
// ============================================

/// **VALUE**: Verifies the channel surface and its method mapping.
///
/// **WHY THIS MATTERS**: The UI sends these exact names. `signup` maps to
/// `createUser`, not `signup`.
///
/// **BUG THIS CATCHES**: Would catch a renamed channel or a wrong method mapping.
#[test]
fn given_channel_names_when_parsed_then_map_to_documented_methods() {
    let table = [
        ("signin", MethodName::Signin),
        ("signup", MethodName::CreateUser),
        ("signout", MethodName::Signout),
        ("decrypt-password", MethodName::Decrypt),
        ("get-passwords", MethodName::GetPasswords),
        ("add-password", MethodName::CreatePassword),
        ("remove-password", MethodName::DeletePassword),
        ("remove-user", MethodName::DeleteUser),
    ];

    for (name, method) in table {
        // WHEN: Parsing the name
        let channel: Channel = name.parse().expect("known channel");

        // THEN: Same name back, documented method, `-response` reply channel
        assert_eq!(channel.name(), name);
        assert_eq!(channel.method(), method);
        assert_eq!(channel.response_name(), format!("{name}-response"));
    }

    assert!(matches!(
        "delete-everything".parse::<Channel>(),
        Err(BridgeError::UnknownChannel { .. })
    ));
}

/// **VALUE**: Verifies payloads with missing fields are rejected, not defaulted.
///
/// **WHY THIS MATTERS**: Defaulting a missing password to "" would attempt a
/// sign-in with an empty password.
///
/// **BUG THIS CATCHES**: Would catch `#[serde(default)]` on payload fields.
#[test]
fn given_payload_missing_field_when_building_operation_then_invalid_payload() {
    // GIVEN/WHEN: signin without a password
    let result = Channel::Signin.operation(json!({"username": ALICE}));

    // THEN: InvalidPayload naming the channel
    match result {
        Err(BridgeError::InvalidPayload { channel, .. }) => assert_eq!(channel, "signin"),
        other => panic!("Expected InvalidPayload, got {other:?}"),
    }

    // GIVEN/WHEN: Channels without a payload accept an empty object
    assert!(Channel::GetPasswords.operation(json!({})).is_ok());
    assert!(Channel::Signout.operation(serde_json::Value::Null).is_ok());
}

// ============================================
// PENDING LEDGER
// ============================================

/// **VALUE**: Verifies two overlapping requests on the same channel each get their own reply.
///
/// **WHY THIS MATTERS**: Double-clicking "reveal" on two rows sends two decrypts
/// before either answers. Without correlation the second row shows the first
/// row's plaintext.
///
/// **BUG THIS CATCHES**: Would catch last-listener-wins matching by channel name.
#[tokio::test]
async fn given_two_overlapping_calls_on_same_channel_when_replies_arrive_reversed_then_each_gets_its_own() {
    // GIVEN: Two open windows on decrypt-password
    let ledger = PendingLedger::new();
    let first = ledger.register(Channel::DecryptPassword);
    let second = ledger.register(Channel::DecryptPassword);
    assert_ne!(first.request_id(), second.request_id());
    assert_eq!(ledger.awaiting(Channel::DecryptPassword), 2);

    // WHEN: Replies arrive in reverse order
    let second_id = second.request_id();
    let first_id = first.request_id();
    assert_eq!(
        ledger.deliver(reply(second_id, "decrypt-password-response", plaintext("second"))),
        Delivery::Delivered
    );
    assert_eq!(
        ledger.deliver(reply(first_id, "decrypt-password-response", plaintext("first"))),
        Delivery::Delivered
    );

    // THEN: Each caller sees the reply to its own request
    assert_eq!(first.wait().await.expect("reply"), plaintext("first"));
    assert_eq!(second.wait().await.expect("reply"), plaintext("second"));
    assert!(ledger.is_empty());
}

/// **VALUE**: Verifies a dropped call unregisters, so a late reply is not misdelivered.
///
/// **WHY THIS MATTERS**: A view that gives up must not leave a handler that fires
/// on the next reply.
///
/// **BUG THIS CATCHES**: Would catch listeners accumulating across calls.
#[test]
fn given_caller_gave_up_when_late_reply_arrives_then_reply_is_unmatched() {
    // GIVEN: A call that is dropped before its reply
    let ledger = PendingLedger::new();
    let call = ledger.register(Channel::GetPasswords);
    let request_id = call.request_id();
    drop(call);
    assert_eq!(ledger.awaiting(Channel::GetPasswords), 0);

    // WHEN: The reply arrives anyway
    let delivery = ledger.deliver(reply(
        request_id,
        "get-passwords-response",
        Response::success(Payload::SecretList(Vec::new())),
    ));

    // THEN: Nobody receives it
    assert_eq!(delivery, Delivery::Unmatched);
}

/// **VALUE**: Verifies a reply on the wrong channel is refused and the caller keeps waiting.
///
/// **WHY THIS MATTERS**: A signin reply must never complete a decrypt call.
///
/// **BUG THIS CATCHES**: Would catch matching on request id alone.
#[tokio::test]
async fn given_reply_on_wrong_channel_when_delivered_then_mismatch_and_caller_still_waits() {
    // GIVEN: A pending decrypt
    let ledger = PendingLedger::new();
    let call = ledger.register(Channel::DecryptPassword);
    let request_id = call.request_id();

    // WHEN: A reply with its id arrives on signin-response
    let delivery = ledger.deliver(reply(
        request_id,
        "signin-response",
        Response::success(Payload::Session(Session::default())),
    ));

    // THEN: Mismatch, and the right reply still gets through
    assert_eq!(
        delivery,
        Delivery::ChannelMismatch {
            expected: String::from("decrypt-password-response")
        }
    );
    assert_eq!(ledger.awaiting(Channel::DecryptPassword), 1);
    ledger.deliver(reply(request_id, "decrypt-password-response", plaintext("ok")));
    assert_eq!(call.wait().await.expect("reply"), plaintext("ok"));
}

/// **VALUE**: Verifies closing the ledger wakes every waiter with Closed.
///
/// **WHY THIS MATTERS**: There is no timeout. A lost connection must not leave
/// views waiting forever.
///
/// **BUG THIS CATCHES**: Would catch `close_all` forgetting to drop the senders.
#[tokio::test]
async fn given_pending_calls_when_ledger_closed_then_waiters_get_closed_error() {
    // GIVEN: A pending call
    let ledger = PendingLedger::new();
    let call = ledger.register(Channel::Signout);

    // WHEN: The connection goes away
    ledger.close_all();

    // THEN: Closed
    assert!(matches!(call.wait().await, Err(BridgeError::Closed { .. })));
}

// ============================================
// RESPONDER
// ============================================

/// **VALUE**: Verifies the responder answers on `<name>-response` with the request id echoed.
///
/// **WHY THIS MATTERS**: The caller's ledger matches on both.
///
/// **BUG THIS CATCHES**: Would catch the reply going out on the request channel.
#[tokio::test]
async fn given_decrypt_request_when_responding_then_reply_on_response_channel_with_same_id() {
    // GIVEN: A responder over the stub
    let responder = responder();

    // WHEN: Answering a decrypt
    let reply = responder
        .respond(BridgeRequest {
            request_id: 41,
            channel: String::from("decrypt-password"),
            payload: json!({"password": CIPHER_ONE}),
        })
        .await;

    // THEN: Same id, reply channel, plaintext
    assert_eq!(reply.request_id, 41);
    assert_eq!(reply.channel, "decrypt-password-response");
    assert_eq!(reply.response, plaintext("hunter2"));
}

/// **VALUE**: Verifies bad requests are answered with InvalidRequest instead of dropped.
///
/// **WHY THIS MATTERS**: An unanswered request leaves the caller waiting forever.
///
/// **BUG THIS CATCHES**: Would catch an early return on parse failure.
#[tokio::test]
async fn given_unknown_channel_or_bad_payload_when_responding_then_invalid_request_reply() {
    // GIVEN: A responder
    let responder = responder();

    // WHEN: Unknown channel
    let unknown = responder
        .respond(BridgeRequest {
            request_id: 1,
            channel: String::from("format-disk"),
            payload: json!({}),
        })
        .await;

    // WHEN: Known channel, wrong payload
    let bad_payload = responder
        .respond(BridgeRequest {
            request_id: 2,
            channel: String::from("add-password"),
            payload: json!({"url": "https://example.com"}),
        })
        .await;

    // THEN: Both answered on their reply channel with InvalidRequest
    assert_eq!(unknown.channel, "format-disk-response");
    assert_eq!(unknown.response.failure_kind(), Some(FailureKind::InvalidRequest));
    assert_eq!(bad_payload.channel, "add-password-response");
    assert_eq!(
        bad_payload.response.failure_kind(),
        Some(FailureKind::InvalidRequest)
    );
}

// ============================================
// WIRE FORMAT
// ============================================

/// **VALUE**: Verifies the JSON frame shapes other processes rely on.
///
/// **WHY THIS MATTERS**: The UI process is not written against this crate's types.
///
/// **BUG THIS CATCHES**: Would catch a changed serde tag or field name.
#[test]
fn given_frames_when_serialized_then_match_documented_json() {
    // GIVEN: A request frame and a success response
    let frame = ClientFrame::Request(BridgeRequest {
        request_id: 7,
        channel: String::from("signout"),
        payload: json!({}),
    });
    let response = Response::success(Payload::BooleanAck(true));
    let failure = Response::failure(FailureKind::Call, "Invalid credentials");

    // WHEN/THEN: Serialized shapes
    assert_eq!(
        serde_json::to_value(&frame).unwrap(),
        json!({"type": "request", "request_id": 7, "channel": "signout", "payload": {}})
    );
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"status": "success", "payload": {"type": "boolean_ack", "value": true}})
    );
    assert_eq!(
        serde_json::to_value(&failure).unwrap(),
        json!({"status": "failure", "kind": "call", "message": "Invalid credentials"})
    );

    // WHEN/THEN: A request without payload still parses
    let parsed: ClientFrame =
        serde_json::from_str(r#"{"type":"request","request_id":3,"channel":"get-passwords"}"#)
            .unwrap();
    assert!(matches!(parsed, ClientFrame::Request(ref r) if r.request_id == 3));
}

// ============================================
// WEBSOCKET TRANSPORT
// ============================================

/// **VALUE**: Verifies a full round trip over the socket.
///
/// **WHY THIS MATTERS**: This is the path every UI action takes.
///
/// **BUG THIS CATCHES**: Would catch handshake, framing or reply routing breaking.
#[tokio::test]
async fn given_authenticated_client_when_calling_signin_then_receives_session() {
    // GIVEN: A server on an ephemeral port and an authenticated client
    let handle = start_bridge_server(0, Some(String::from(TEST_AUTH_TOKEN)), responder())
        .await
        .expect("Failed to start bridge server");
    let client = BridgeClient::connect(handle.port(), TEST_AUTH_TOKEN)
        .await
        .expect("Failed to connect");

    // WHEN: Signing in
    let response = client
        .call(
            Channel::Signin,
            json!({"username": ALICE, "password": ALICE_PASSWORD}),
        )
        .await
        .expect("call should complete");

    // THEN: Session for alice
    assert_eq!(
        response,
        Response::success(Payload::Session(Session {
            username: Some(ALICE.to_string())
        }))
    );
    assert!(client.ledger().is_empty());

    handle.shutdown();
}

/// **VALUE**: Verifies overlapping same-channel calls over the socket resolve correctly.
///
/// **WHY THIS MATTERS**: The slow decrypt finishes last; its plaintext must still
/// land with its own caller, not with whoever registered most recently.
///
/// **BUG THIS CATCHES**: Would catch reply misattribution under overlap.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_overlapping_decrypts_over_socket_when_awaited_then_each_gets_its_plaintext() {
    // GIVEN: Server and client
    let handle = start_bridge_server(0, Some(String::from(TEST_AUTH_TOKEN)), responder())
        .await
        .expect("Failed to start bridge server");
    let client = BridgeClient::connect(handle.port(), TEST_AUTH_TOKEN)
        .await
        .expect("Failed to connect");

    // WHEN: Three decrypts are in flight before any reply is read
    let slow = client
        .send(Channel::DecryptPassword, json!({"password": CIPHER_SLOW}))
        .await
        .expect("send slow");
    let one = client
        .send(Channel::DecryptPassword, json!({"password": CIPHER_ONE}))
        .await
        .expect("send one");
    let two = client
        .send(Channel::DecryptPassword, json!({"password": CIPHER_TWO}))
        .await
        .expect("send two");
    assert_eq!(client.ledger().awaiting(Channel::DecryptPassword), 3);

    // THEN: Each caller gets the plaintext of its own ciphertext
    assert_eq!(two.wait().await.expect("reply"), plaintext("letmein"));
    assert_eq!(one.wait().await.expect("reply"), plaintext("hunter2"));
    assert_eq!(slow.wait().await.expect("reply"), plaintext("slow-plaintext"));

    handle.shutdown();
}

/// **VALUE**: Verifies a wrong token is refused during the handshake.
///
/// **WHY THIS MATTERS**: Without the token check any local process could decrypt secrets.
///
/// **BUG THIS CATCHES**: Would catch the server accepting any first frame.
#[tokio::test]
async fn given_wrong_token_when_connecting_then_auth_error() {
    // GIVEN: A server with a known token
    let handle = start_bridge_server(0, Some(String::from(TEST_AUTH_TOKEN)), responder())
        .await
        .expect("Failed to start bridge server");

    // WHEN: Connecting with another token
    let result = BridgeClient::connect(handle.port(), "wrong-token").await;

    // THEN: Auth error
    assert!(matches!(result, Err(BridgeError::Auth { .. })));

    handle.shutdown();
}

/// **VALUE**: Verifies a generated token is exposed on the handle and works.
///
/// **WHY THIS MATTERS**: The shell starts without a configured token and must
/// hand the generated one to the UI process.
///
/// **BUG THIS CATCHES**: Would catch the handle reporting a different token than the server checks.
#[tokio::test]
async fn given_no_configured_token_when_server_starts_then_handle_token_authenticates() {
    // GIVEN: A server with a generated token
    let handle = start_bridge_server(0, None, responder())
        .await
        .expect("Failed to start bridge server");
    assert!(!handle.auth_token().is_empty());
    assert!(handle.local_addr().ip().is_loopback());

    // WHEN: Connecting with the handle's token
    let client = BridgeClient::connect(handle.port(), handle.auth_token()).await;

    // THEN: Connected
    assert!(client.is_ok());

    handle.shutdown();
}

/// **VALUE**: Verifies shutdown stops accepting connections.
///
/// **WHY THIS MATTERS**: A stale server on the port blocks the next start.
///
/// **BUG THIS CATCHES**: Would catch `shutdown` leaving the accept loop alive.
#[tokio::test]
async fn given_running_server_when_shutdown_then_new_connections_fail() {
    // GIVEN: A running server
    let handle = start_bridge_server(0, Some(String::from(TEST_AUTH_TOKEN)), responder())
        .await
        .expect("Failed to start bridge server");
    let port = handle.port();
    assert!(handle.is_running());

    // WHEN: Shutting down
    handle.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // THEN: Stopped, and connecting fails
    assert!(!handle.is_running());
    assert!(BridgeClient::connect(port, TEST_AUTH_TOKEN).await.is_err());
}
