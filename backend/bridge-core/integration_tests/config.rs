use bridge_core::codec::CodecKind;
use bridge_core::config::env::{BRIDGE_PORT_VAR, CODEC_VAR, LIBRARY_DIR_VAR};
use bridge_core::config::{AppConfig, DEFAULT_BRIDGE_PORT, EnvOverrides};
use bridge_core::error::config::ConfigError;
use bridge_core::gateway::LibraryPlatform;

use std::path::PathBuf;

use serial_test::serial;

/// **VALUE**: Verifies a missing config file yields defaults.
///
/// **WHY THIS MATTERS**: First launch has no config file and must still start.
///
/// **BUG THIS CATCHES**: Would catch load treating "not found" as an error.
#[test]
fn given_no_config_file_when_loading_then_returns_defaults() {
    // GIVEN: An empty config directory
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    // WHEN: Loading
    let config = AppConfig::load(temp_dir.path()).expect("load should succeed");

    // THEN: Defaults
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.native.library_name, "passguard_api");
    assert_eq!(config.native.codec, CodecKind::JsonEnvelope);
    assert_eq!(config.bridge.port, DEFAULT_BRIDGE_PORT);
    assert_eq!(config.bridge.auth_token, None);
}

/// **VALUE**: Verifies saved config loads back unchanged and no temp file remains.
///
/// **WHY THIS MATTERS**: Settings that do not survive a restart are lost settings.
///
/// **BUG THIS CATCHES**: Would catch a field missing from serialization or a
/// rename that never happened.
#[test]
fn given_custom_config_when_saved_and_loaded_then_values_survive() {
    // GIVEN: A customised config
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = AppConfig::default();
    config.native.library_dir = Some(PathBuf::from("/opt/passguard/lib"));
    config.native.codec = CodecKind::FixedRecord;
    config.bridge.port = 20001;
    config.bridge.auth_token = Some(String::from("token"));

    // WHEN: Saving then loading
    config.save(temp_dir.path()).expect("save should succeed");
    let loaded = AppConfig::load(temp_dir.path()).expect("load should succeed");

    // THEN: Same values, no leftover temp file
    assert_eq!(loaded, config);
    assert!(!temp_dir.path().join("config.json.tmp").exists());
}

/// **VALUE**: Verifies sections missing from the file fall back to defaults.
///
/// **WHY THIS MATTERS**: Users edit only the key they care about.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]`.
#[test]
fn given_partial_config_file_when_loading_then_missing_values_default() {
    // GIVEN: A file that only sets the codec
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        temp_dir.path().join("config.json"),
        r#"{"native": {"codec": "fixed_record"}}"#,
    )
    .expect("write config");

    // WHEN: Loading
    let config = AppConfig::load(temp_dir.path()).expect("load should succeed");

    // THEN: Codec set, everything else default
    assert_eq!(config.native.codec, CodecKind::FixedRecord);
    assert_eq!(config.native.library_name, "passguard_api");
    assert_eq!(config.bridge.port, DEFAULT_BRIDGE_PORT);
    assert_eq!(config.version, 1);
}

/// **VALUE**: Verifies a corrupt file is an error rather than silently replaced.
///
/// **WHY THIS MATTERS**: Falling back to defaults would point the app at a
/// different native module without telling anyone.
///
/// **BUG THIS CATCHES**: Would catch parse failures mapped to defaults.
#[test]
fn given_corrupt_config_file_when_loading_then_returns_parse_error() {
    // GIVEN: Invalid JSON
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(temp_dir.path().join("config.json"), "{ not json").expect("write config");

    // WHEN: Loading
    let result = AppConfig::load(temp_dir.path());

    // THEN: ParseError
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies each validation rule.
///
/// **WHY THIS MATTERS**: The library name is joined with a platform prefix and
/// extension; a name that already has them resolves to `liblibx.so.so`.
///
/// **BUG THIS CATCHES**: Would catch a rule that was dropped.
#[test]
fn given_invalid_values_when_validating_then_each_is_rejected() {
    let invalid = [
        AppConfig {
            version: 0,
            ..AppConfig::default()
        },
        AppConfig {
            version: 99,
            ..AppConfig::default()
        },
    ];
    for config in invalid {
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    for name in ["", "  ", "lib/passguard_api", "passguard_api.so", "passguard_api.dll"] {
        let mut config = AppConfig::default();
        config.native.library_name = name.to_string();
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "'{name}' should be rejected"
        );
    }

    let mut zero_port = AppConfig::default();
    zero_port.bridge.port = 0;
    assert!(zero_port.validate().is_err());

    let mut empty_token = AppConfig::default();
    empty_token.bridge.auth_token = Some(String::new());
    assert!(empty_token.validate().is_err());

    assert!(AppConfig::default().validate().is_ok());
}

/// **VALUE**: Verifies saving an invalid config writes nothing.
///
/// **WHY THIS MATTERS**: A bad save would make the next launch fail to load.
///
/// **BUG THIS CATCHES**: Would catch validation running after the write.
#[test]
fn given_invalid_config_when_saving_then_nothing_is_written() {
    // GIVEN: Port 0
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = AppConfig::default();
    config.bridge.port = 0;

    // WHEN: Saving
    let result = config.save(temp_dir.path());

    // THEN: Error and no file
    assert!(result.is_err());
    assert!(!temp_dir.path().join("config.json").exists());
}

/// **VALUE**: Verifies the loader path combines directory and platform file name.
///
/// **WHY THIS MATTERS**: This is the exact path handed to the dynamic loader.
///
/// **BUG THIS CATCHES**: Would catch the directory being ignored.
#[test]
fn given_library_dir_when_building_library_path_then_joined_with_platform_name() {
    // GIVEN: A config with a directory
    let mut config = AppConfig::default();
    config.native.library_dir = Some(PathBuf::from("/opt/passguard"));

    // WHEN/THEN: Joined
    assert_eq!(
        config.library_path(),
        PathBuf::from("/opt/passguard").join(LibraryPlatform::current().file_name("passguard_api"))
    );
}

/// **VALUE**: Verifies overrides replace loaded values and are validated.
///
/// **WHY THIS MATTERS**: A typo in an override must stop startup, not be ignored.
///
/// **BUG THIS CATCHES**: Would catch unparsable overrides being skipped silently.
#[test]
fn given_overrides_when_applied_then_values_replaced_or_rejected() {
    // GIVEN: Valid overrides
    let mut config = AppConfig::default();
    let overrides = EnvOverrides {
        library_dir: Some(PathBuf::from("/tmp/native")),
        codec: Some(String::from("fixed_record")),
        bridge_port: Some(String::from("20002")),
    };

    // WHEN: Applying
    config.apply_overrides(&overrides).expect("overrides should apply");

    // THEN: Replaced
    assert_eq!(config.native.library_dir, Some(PathBuf::from("/tmp/native")));
    assert_eq!(config.native.codec, CodecKind::FixedRecord);
    assert_eq!(config.bridge.port, 20002);

    // WHEN/THEN: Bad port, zero port and unknown codec are rejected
    for bad in [
        EnvOverrides {
            bridge_port: Some(String::from("not-a-port")),
            ..EnvOverrides::default()
        },
        EnvOverrides {
            bridge_port: Some(String::from("0")),
            ..EnvOverrides::default()
        },
        EnvOverrides {
            codec: Some(String::from("protobuf")),
            ..EnvOverrides::default()
        },
    ] {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.apply_overrides(&bad),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}

/// **VALUE**: Verifies the `PASSGUARD_*` variables are read and empty ones ignored.
///
/// **WHY THIS MATTERS**: `PASSGUARD_CODEC=` in a `.env` template must not override.
///
/// **BUG THIS CATCHES**: Would catch an empty string overriding the config file.
#[test]
#[serial]
fn given_env_vars_when_reading_overrides_then_set_values_are_returned() {
    // GIVEN: Two set variables and one empty
    // SAFETY: serialised with every other test that touches the environment.
    unsafe {
        std::env::set_var(LIBRARY_DIR_VAR, "/srv/passguard");
        std::env::set_var(CODEC_VAR, "record");
        std::env::set_var(BRIDGE_PORT_VAR, "");
    }

    // WHEN: Reading
    let overrides = EnvOverrides::from_env();

    // THEN: Only the non-empty ones
    assert_eq!(overrides.library_dir, Some(PathBuf::from("/srv/passguard")));
    assert_eq!(overrides.codec.as_deref(), Some("record"));
    assert_eq!(overrides.bridge_port, None);

    // SAFETY: as above.
    unsafe {
        std::env::remove_var(LIBRARY_DIR_VAR);
        std::env::remove_var(CODEC_VAR);
        std::env::remove_var(BRIDGE_PORT_VAR);
    }

    assert!(EnvOverrides::from_env().is_empty());
}

/// **VALUE**: Verifies Debug output never contains the bridge token.
///
/// **WHY THIS MATTERS**: The loaded config is logged at startup.
///
/// **BUG THIS CATCHES**: Would catch a derived Debug on `BridgeConfig`.
#[test]
fn given_config_with_token_when_debug_formatted_then_token_redacted() {
    // GIVEN: A config with a token
    let mut config = AppConfig::default();
    config.bridge.auth_token = Some(String::from("super-secret-token"));

    // WHEN: Formatting
    let debug = format!("{config:?}");

    // THEN: Redacted
    assert!(!debug.contains("super-secret-token"));
    assert!(debug.contains("[REDACTED]"));
}
