//! Configuration for the test driver.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Entry point and exit-status policy constants.
//! 2. **Structures:** The root `Config` and its `general` section.
//! 3. **Loading:** JSON deserialization from a file.
//!
//! The CLI uses `Config::default()` unless `--config` names a JSON file; flags then override
//! individual fields.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants for the driver.
mod defaults {
    /// Program counter sent to the core after each image load.
    pub const START_PC: u32 = crate::common::DEFAULT_START_PC;

    /// Whether a failing exit code from the core fails the whole process.
    ///
    /// Off: only load and transport failures make the process exit non-zero.
    pub const FAIL_ON_EXIT_CODE: bool = false;
}

/// Root configuration structure containing all driver settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use testdriver_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.general.start_pc, 0x200);
/// assert!(!config.general.fail_on_exit_code);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use testdriver_core::config::Config;
///
/// let json = r#"{
///     "general": {
///         "start_pc": 4096,
///         "fail_on_exit_code": true
///     }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.general.start_pc, 0x1000);
/// assert!(config.general.fail_on_exit_code);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General run settings
    #[serde(default)]
    pub general: GeneralConfig,
}

impl Config {
    /// Reads and deserializes a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid configuration JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// General run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Start PC sent on the fromhost port after each image is loaded
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u32,

    /// Make any non-zero core exit code fail the process, not just load errors
    #[serde(default = "GeneralConfig::default_fail_on_exit_code")]
    pub fail_on_exit_code: bool,
}

impl GeneralConfig {
    /// Returns the default starting program counter.
    const fn default_start_pc() -> u32 {
        defaults::START_PC
    }

    const fn default_fail_on_exit_code() -> bool {
        defaults::FAIL_ON_EXIT_CODE
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            start_pc: defaults::START_PC,
            fail_on_exit_code: defaults::FAIL_ON_EXIT_CODE,
        }
    }
}
