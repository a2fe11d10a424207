pub mod env;

pub use env::{EnvOverrides, default_config_dir, try_load_dotenv};

use crate::NATIVE_LIBRARY_NAME;
use crate::codec::CodecKind;
use crate::error::config::ConfigError;
use crate::gateway::{LibrarySource, library_path};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_BRIDGE_PORT: u16 = 19877;
const SHARED_LIBRARY_EXTENSIONS: [&str; 3] = [".so", ".dll", ".dylib"];

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeConfig {
    #[serde(default = "default_library_name")]
    pub library_name: String,
    pub library_dir: Option<PathBuf>,
    #[serde(default)]
    pub codec: CodecKind,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            library_name: default_library_name(),
            library_dir: None,
            codec: CodecKind::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_port")]
    pub port: u16,
    pub auth_token: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: default_bridge_port(),
            auth_token: None,
        }
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub native: NativeConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            native: NativeConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_library_name() -> String {
    NATIVE_LIBRARY_NAME.to_string()
}
fn default_bridge_port() -> u16 {
    DEFAULT_BRIDGE_PORT
}

// ============================================
// IMPLEMENTATION
// ============================================

impl AppConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(AppConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: AppConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - Validation fails
    /// - Directory creation fails
    /// - Serialization fails
    /// - Write or rename fails
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        // Atomic on POSIX
        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        let name = &self.native.library_name;
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "library_name cannot be empty".to_string(),
            });
        }

        if name.contains('/') || name.contains('\\') {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "library_name '{}' must be a bare name; use library_dir for the directory",
                    name
                ),
            });
        }

        if SHARED_LIBRARY_EXTENSIONS
            .iter()
            .any(|extension| name.ends_with(extension))
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "library_name '{}' must not include a file extension",
                    name
                ),
            });
        }

        if self.bridge.port == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "bridge port cannot be 0".to_string(),
            });
        }

        if let Some(ref token) = self.bridge.auth_token {
            if token.is_empty() {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: "auth_token cannot be empty string".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Path handed to the dynamic loader for the configured native module.
    pub fn library_path(&self) -> PathBuf {
        library_path(
            &self.native.library_name,
            self.native.library_dir.as_deref(),
        )
    }

    pub fn library_source(&self) -> LibrarySource {
        LibrarySource::Path(self.library_path())
    }

    /// Layer environment overrides on top of the loaded values, then re-validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override cannot be parsed
    /// or leaves the config invalid.
    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) -> Result<(), ConfigError> {
        if let Some(ref dir) = overrides.library_dir {
            info!("Using PASSGUARD_LIBRARY_DIR override: {}", dir.display());
            self.native.library_dir = Some(dir.clone());
        }

        if let Some(ref codec) = overrides.codec {
            self.native.codec = codec.parse::<CodecKind>().map_err(|e| {
                ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: e.to_string(),
                }
            })?;
            info!("Using PASSGUARD_CODEC override: {}", self.native.codec);
        }

        if let Some(ref port) = overrides.bridge_port {
            self.bridge.port = port.trim().parse::<u16>().map_err(|e| {
                ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("Invalid PASSGUARD_BRIDGE_PORT '{}': {}", port, e),
                }
            })?;
            info!("Using PASSGUARD_BRIDGE_PORT override: {}", self.bridge.port);
        }

        self.validate()
    }
}
