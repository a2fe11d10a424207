use bridge_core::dispatcher::SecretRecord;

use passguard::state::{ViewCommand, ViewState};

fn secret(id: &str) -> SecretRecord {
    SecretRecord {
        id: id.to_string(),
        url: format!("https://{id}.example.com"),
        password: format!("cipher-{id}"),
    }
}

/// **VALUE**: Verifies an update is visible to reads as soon as `update` returns.
///
/// **WHY THIS MATTERS**: The adapter updates then the view re-renders immediately.
/// A lagging actor would render the old list.
///
/// **BUG THIS CATCHES**: Would catch `update` returning before the actor applied it.
#[tokio::test]
async fn given_fresh_state_when_signed_in_then_username_visible_immediately() {
    // GIVEN: Fresh state
    let state = ViewState::new();
    assert!(!state.is_signed_in().await);

    // WHEN: Signing in
    state
        .update(ViewCommand::SignedIn(String::from("alice")))
        .await
        .expect("update should succeed");

    // THEN: Visible without yielding
    assert_eq!(state.username().await.as_deref(), Some("alice"));
}

/// **VALUE**: Verifies removal and sign-out semantics on the snapshot.
///
/// **WHY THIS MATTERS**: After sign-out, the next user must not see the previous
/// user's list.
///
/// **BUG THIS CATCHES**: Would catch sign-out clearing only the username.
#[tokio::test]
async fn given_loaded_secrets_when_removed_and_signed_out_then_snapshot_updates() {
    // GIVEN: A signed-in user with two secrets
    let state = ViewState::default();
    state
        .update(ViewCommand::SignedIn(String::from("alice")))
        .await
        .unwrap();
    state
        .update(ViewCommand::SecretsLoaded(vec![secret("1"), secret("2")]))
        .await
        .unwrap();

    // WHEN: Removing one
    state
        .update(ViewCommand::SecretRemoved(String::from("1")))
        .await
        .unwrap();

    // THEN: Only the other remains
    assert_eq!(state.secrets().await, vec![secret("2")]);

    // WHEN: Signing out
    state.update(ViewCommand::SignedOut).await.unwrap();

    // THEN: Nothing left
    assert!(!state.is_signed_in().await);
    assert!(state.secrets().await.is_empty());
}

/// **VALUE**: Verifies clones share one actor and one snapshot.
///
/// **WHY THIS MATTERS**: Every view holds a clone; they must agree.
///
/// **BUG THIS CATCHES**: Would catch each clone spawning its own actor and data.
#[tokio::test]
async fn given_cloned_state_when_one_clone_updates_then_other_sees_it() {
    // GIVEN: Two clones
    let state = ViewState::new();
    let other = state.clone();

    // WHEN: Concurrent updates through both
    let (a, b) = tokio::join!(
        state.update(ViewCommand::SecretsLoaded(vec![secret("1")])),
        other.update(ViewCommand::SignedIn(String::from("bob"))),
    );
    a.unwrap();
    b.unwrap();

    // THEN: Both views agree
    assert_eq!(state.username().await, other.username().await);
    assert_eq!(other.secrets().await, vec![secret("1")]);
}
