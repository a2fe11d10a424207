use crate::bridge::connection_state::ConnectionState;

/// **VALUE**: Verifies a connection only becomes authenticated with the exact token.
///
/// **WHY THIS MATTERS**: The bridge hands out decrypted secrets. Any local process
/// that can open a socket must not get them without the token.
///
/// **BUG THIS CATCHES**: Would catch prefix matching or a default-authenticated state.
#[test]
fn given_connection_when_validating_tokens_then_only_exact_match_authenticates() {
    // GIVEN: A fresh connection
    let mut state = ConnectionState::new(String::from("secret-token"));
    assert!(!state.is_authenticated());

    // WHEN: Presenting wrong tokens
    assert!(!state.validate_token("secret"));
    assert!(!state.validate_token(""));

    // THEN: Still unauthenticated
    assert!(!state.is_authenticated());

    // WHEN: Presenting the right token
    assert!(state.validate_token("secret-token"));

    // THEN: Authenticated
    assert!(state.is_authenticated());
}
