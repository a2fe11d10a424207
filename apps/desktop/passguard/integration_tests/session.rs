use crate::stub_native::{PASSWORD, TEST_AUTH_TOKEN, USERNAME, start_stub_bridge};

use bridge_core::dispatcher::{FailureKind, Payload, Response};

use common::RedactedSecret;

use passguard::session::SessionAdapter;

use serial_test::serial;

async fn signed_in_adapter(port: u16) -> SessionAdapter {
    let adapter = SessionAdapter::connect(port, TEST_AUTH_TOKEN)
        .await
        .expect("Failed to connect");
    let response = adapter
        .signin(USERNAME, &RedactedSecret::from(PASSWORD))
        .await
        .expect("signin should complete");
    assert!(response.is_success());
    adapter
}

/// **VALUE**: Verifies a successful sign-in updates the view with the native username.
///
/// **WHY THIS MATTERS**: This is the first thing every user does.
///
/// **BUG THIS CATCHES**: Would catch the adapter ignoring the reply payload.
#[tokio::test]
#[serial]
async fn given_correct_credentials_when_signin_then_view_is_signed_in() {
    // GIVEN: A bridge in front of the stub
    let handle = start_stub_bridge().await;

    // WHEN: Signing in
    let adapter = signed_in_adapter(handle.port()).await;

    // THEN: Signed in as alice
    assert_eq!(adapter.view().username().await.as_deref(), Some(USERNAME));

    handle.shutdown();
}

/// **VALUE**: Verifies a failed sign-in leaves the view untouched and returns the failure.
///
/// **WHY THIS MATTERS**: Wrong passwords must not sign anyone in.
///
/// **BUG THIS CATCHES**: Would catch state being updated before checking the discriminant.
#[tokio::test]
#[serial]
async fn given_wrong_password_when_signin_then_call_failure_and_view_unchanged() {
    // GIVEN: A connected adapter
    let handle = start_stub_bridge().await;
    let adapter = SessionAdapter::connect(handle.port(), TEST_AUTH_TOKEN)
        .await
        .expect("Failed to connect");

    // WHEN: Signing in with the wrong password
    let response = adapter
        .signin(USERNAME, &RedactedSecret::from("wrong"))
        .await
        .expect("signin should complete");

    // THEN: Call failure; still signed out
    assert_eq!(response.failure_kind(), Some(FailureKind::Call));
    assert!(!adapter.view().is_signed_in().await);

    handle.shutdown();
}

/// **VALUE**: Verifies the add → refresh → reveal → remove workflow.
///
/// **WHY THIS MATTERS**: Each step is an independent call; the list is only as
/// fresh as the last refresh.
///
/// **BUG THIS CATCHES**: Would catch add_secret mutating the snapshot, or
/// remove_secret not pruning it.
#[tokio::test]
#[serial]
async fn given_signed_in_user_when_managing_secrets_then_view_follows_successes() {
    // GIVEN: A signed-in adapter
    let handle = start_stub_bridge().await;
    let adapter = signed_in_adapter(handle.port()).await;

    // WHEN: Adding a secret
    let added = adapter
        .add_secret("https://example.com", &RedactedSecret::from("hunter2"))
        .await
        .expect("add should complete");

    // THEN: Success, but the snapshot is unchanged until refresh
    assert!(added.is_success());
    assert!(adapter.view().secrets().await.is_empty());

    // WHEN: Refreshing
    let listed = adapter.refresh_secrets().await.expect("refresh should complete");

    // THEN: One secret in both the reply and the view
    let secrets = adapter.view().secrets().await;
    assert_eq!(listed.payload(), Some(&Payload::SecretList(secrets.clone())));
    assert_eq!(secrets.len(), 1);
    assert_eq!(secrets[0].url, "https://example.com");

    // WHEN: Revealing it
    let revealed = adapter
        .reveal_secret(&secrets[0].password)
        .await
        .expect("reveal should complete");

    // THEN: Plaintext returned
    assert_eq!(
        revealed,
        Response::success(Payload::PlaintextSecret(String::from("hunter2")))
    );

    // WHEN: Removing it
    let removed = adapter
        .remove_secret(&secrets[0].id)
        .await
        .expect("remove should complete");

    // THEN: Gone from the view
    assert!(removed.is_success());
    assert!(adapter.view().secrets().await.is_empty());

    handle.shutdown();
}

/// **VALUE**: Verifies removing an unknown id is a failure and leaves the view alone.
///
/// **WHY THIS MATTERS**: The native module answers `false` for unknown ids.
///
/// **BUG THIS CATCHES**: Would catch SecretRemoved being sent on failure.
#[tokio::test]
#[serial]
async fn given_unknown_id_when_remove_secret_then_failure_and_snapshot_kept() {
    // GIVEN: One stored and listed secret
    let handle = start_stub_bridge().await;
    let adapter = signed_in_adapter(handle.port()).await;
    adapter
        .add_secret("https://example.com", &RedactedSecret::from("pw"))
        .await
        .unwrap();
    adapter.refresh_secrets().await.unwrap();

    // WHEN: Removing an id that does not exist
    let response = adapter.remove_secret("999").await.unwrap();

    // THEN: Failure; snapshot intact
    assert_eq!(response.failure_kind(), Some(FailureKind::Call));
    assert_eq!(adapter.view().secrets().await.len(), 1);

    handle.shutdown();
}

/// **VALUE**: Verifies sign-out clears the view.
///
/// **WHY THIS MATTERS**: A shared machine must not show the previous user's list.
///
/// **BUG THIS CATCHES**: Would catch sign-out only clearing the username.
#[tokio::test]
#[serial]
async fn given_signed_in_with_secrets_when_signout_then_view_cleared() {
    // GIVEN: Signed in with a listed secret
    let handle = start_stub_bridge().await;
    let adapter = signed_in_adapter(handle.port()).await;
    adapter
        .add_secret("https://example.com", &RedactedSecret::from("pw"))
        .await
        .unwrap();
    adapter.refresh_secrets().await.unwrap();

    // WHEN: Signing out
    let response = adapter.signout().await.unwrap();

    // THEN: Cleared
    assert!(response.is_success());
    assert!(!adapter.view().is_signed_in().await);
    assert!(adapter.view().secrets().await.is_empty());

    handle.shutdown();
}

/// **VALUE**: Verifies a rejected sign-in while signed in signs the view out.
///
/// **WHY THIS MATTERS**: The native module drops its session before checking
/// credentials. A view still showing the old user would send calls that all
/// fail as unauthorized.
///
/// **BUG THIS CATCHES**: Would catch the view keeping the previous user after
/// a failed second sign-in.
#[tokio::test]
#[serial]
async fn given_signed_in_user_when_signin_rejected_then_view_signed_out() {
    // GIVEN: A signed-in adapter with a listed secret
    let handle = start_stub_bridge().await;
    let adapter = signed_in_adapter(handle.port()).await;
    adapter
        .add_secret("https://example.com", &RedactedSecret::from("pw"))
        .await
        .unwrap();
    adapter.refresh_secrets().await.unwrap();
    assert!(adapter.view().is_signed_in().await);

    // WHEN: Signing in again with the wrong password
    let response = adapter
        .signin(USERNAME, &RedactedSecret::from("wrong"))
        .await
        .expect("signin should complete");

    // THEN: Call failure, and the view matches the native side
    assert_eq!(response.failure_kind(), Some(FailureKind::Call));
    assert!(!adapter.view().is_signed_in().await);
    assert!(adapter.view().secrets().await.is_empty());

    // THEN: The native side agrees; listing needs a new sign-in
    let listed = adapter.refresh_secrets().await.unwrap();
    assert_eq!(listed.failure_kind(), Some(FailureKind::Call));

    handle.shutdown();
}

/// **VALUE**: Verifies sign-up signs the new account in and removing it signs out.
///
/// **WHY THIS MATTERS**: Both calls change who the native module thinks is
/// signed in.
///
/// **BUG THIS CATCHES**: Would catch sign-up leaving the view signed out, or
/// account removal leaving it signed in.
#[tokio::test]
#[serial]
async fn given_new_account_when_signup_then_remove_account_then_view_follows() {
    // GIVEN: A connected adapter
    let handle = start_stub_bridge().await;
    let adapter = SessionAdapter::connect(handle.port(), TEST_AUTH_TOKEN)
        .await
        .expect("Failed to connect");

    // WHEN: Signing up
    let created = adapter
        .signup("bob", &RedactedSecret::from("s3cret"))
        .await
        .unwrap();

    // THEN: Signed in as bob
    assert!(created.is_success());
    assert_eq!(adapter.view().username().await.as_deref(), Some("bob"));

    // WHEN: Removing the account
    let removed = adapter.remove_account("bob").await.unwrap();

    // THEN: Signed out
    assert!(removed.is_success());
    assert!(!adapter.view().is_signed_in().await);

    handle.shutdown();
}
