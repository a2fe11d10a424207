use bridge_core::codec::CodecKind;
use bridge_core::config::AppConfig;
use bridge_core::config::env::{BRIDGE_PORT_VAR, CODEC_VAR, LIBRARY_DIR_VAR};

use passguard::error::PassguardError;
use passguard::startup::{load_gateway, resolve_config, start_responder};

use std::sync::Arc;

use bridge_core::gateway::NativeGateway;
use serial_test::serial;

fn clear_env() {
    // SAFETY: only called from #[serial] tests.
    unsafe {
        std::env::remove_var(LIBRARY_DIR_VAR);
        std::env::remove_var(CODEC_VAR);
        std::env::remove_var(BRIDGE_PORT_VAR);
    }
}

/// **VALUE**: Verifies environment overrides win over `config.json`.
///
/// **WHY THIS MATTERS**: Packagers point the app at the bundled native module
/// through the environment.
///
/// **BUG THIS CATCHES**: Would catch overrides applied before loading the file.
#[test]
#[serial]
fn given_config_file_and_env_override_when_resolving_then_env_wins() {
    // GIVEN: A saved config with the JSON codec and a codec override
    clear_env();
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    AppConfig::default().save(temp_dir.path()).expect("save");
    // SAFETY: #[serial]
    unsafe { std::env::set_var(CODEC_VAR, "fixed_record") };

    // WHEN: Resolving
    let config = resolve_config(temp_dir.path()).expect("resolve should succeed");

    // THEN: Override applied
    assert_eq!(config.native.codec, CodecKind::FixedRecord);

    clear_env();
}

/// **VALUE**: Verifies an invalid override stops startup with a config error.
///
/// **WHY THIS MATTERS**: Listening on a different port than the UI expects looks
/// like a hang.
///
/// **BUG THIS CATCHES**: Would catch a bad override silently ignored.
#[test]
#[serial]
fn given_invalid_port_override_when_resolving_then_config_error() {
    // GIVEN: A bad port override
    clear_env();
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    // SAFETY: #[serial]
    unsafe { std::env::set_var(BRIDGE_PORT_VAR, "70000") };

    // WHEN: Resolving
    let result = resolve_config(temp_dir.path());

    // THEN: Config error
    assert!(matches!(result, Err(PassguardError::Config { .. })));

    clear_env();
}

/// **VALUE**: Verifies a missing native module is a load error at startup.
///
/// **WHY THIS MATTERS**: The process must exit before accepting requests it
/// cannot answer.
///
/// **BUG THIS CATCHES**: Would catch lazy loading deferring the failure to the
/// first user action.
#[test]
fn given_missing_native_module_when_loading_gateway_then_load_error() {
    // GIVEN: A library directory with no library in it
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = AppConfig::default();
    config.native.library_dir = Some(temp_dir.path().to_path_buf());

    // WHEN: Loading
    let result = load_gateway(&config);

    // THEN: Load error naming the path
    match result {
        Err(PassguardError::Load { message, .. }) => {
            assert!(message.contains(&config.library_path().display().to_string()));
        }
        Err(other) => panic!("Expected Load, got {other:?}"),
        Ok(_) => panic!("Expected a load error"),
    }
}

/// **VALUE**: Verifies the bridge refuses to start over an unloaded gateway.
///
/// **WHY THIS MATTERS**: Skipping the load check would defer load errors to the
/// first request.
///
/// **BUG THIS CATCHES**: Would catch `start_responder` being called out of order.
#[tokio::test]
async fn given_unloaded_gateway_when_starting_responder_then_load_error() {
    // GIVEN: A gateway that was never loaded
    let config = AppConfig::default();
    let gateway = Arc::new(NativeGateway::new(config.library_source()));

    // WHEN: Starting
    let result = start_responder(&config, gateway).await;

    // THEN: Load error
    assert!(matches!(result, Err(PassguardError::Load { .. })));
}
