//! Environment layer on top of `config.json`.
//!
//! Resolution order (first wins):
//! 1. Process environment
//! 2. `.env` in the current directory
//! 3. `.env` next to the executable

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const LIBRARY_DIR_VAR: &str = "PASSGUARD_LIBRARY_DIR";
pub const CODEC_VAR: &str = "PASSGUARD_CODEC";
pub const BRIDGE_PORT_VAR: &str = "PASSGUARD_BRIDGE_PORT";

const APP_DIR_NAME: &str = "passguard";

/// Raw override values as found in the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub library_dir: Option<PathBuf>,
    pub codec: Option<String>,
    pub bridge_port: Option<String>,
}

impl EnvOverrides {
    /// Read the `PASSGUARD_*` variables. Empty values count as unset.
    pub fn from_env() -> Self {
        Self {
            library_dir: read_var(LIBRARY_DIR_VAR).map(PathBuf::from),
            codec: read_var(CODEC_VAR),
            bridge_port: read_var(BRIDGE_PORT_VAR),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.library_dir.is_none() && self.codec.is_none() && self.bridge_port.is_none()
    }
}

fn read_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => {
            debug!("{} is set but empty, ignoring", name);
            None
        }
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            warn!("Env var {} contains invalid unicode, ignoring", name);
            None
        }
    }
}

/// Attempts to load `.env` from known locations.
///
/// Returns the file that was loaded, if any. Variables already present in the
/// process environment are never overwritten.
pub fn try_load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return Some(path);
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let env_path = exe_dir.join(".env");
            if env_path.exists() {
                match dotenvy::from_path(&env_path) {
                    Ok(()) => {
                        info!("Loaded .env from: {:?}", env_path);
                        return Some(env_path);
                    }
                    Err(e) => {
                        warn!("Failed to parse .env at {:?}: {}", env_path, e);
                    }
                }
            }
        }
    }

    debug!("No .env file found");
    None
}

/// `<platform config dir>/passguard`, or `None` if the platform has no config dir.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}
