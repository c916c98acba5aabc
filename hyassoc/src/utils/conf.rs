use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    magic::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENV_ASSOC_CONFIG_PATH, MAX_INITIAL_CAPACITY},
    utils::error::{AssocError, AssocResult},
};

/// Tuning knobs for a [`crate::registry::Registry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of instances the registry reserves room for up front. At most
    /// [`MAX_INITIAL_CAPACITY`].
    pub initial_capacity: usize,

    /// Number of shards of the underlying concurrent map. `None` lets `dashmap` pick one
    /// from the number of available cores. Must be a power of two greater than 1.
    pub shard_amount: Option<usize>,

    /// Whether key hash collisions are reported through the `log` facade.
    pub log_collisions: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            shard_amount: None,
            log_collisions: true,
        }
    }
}

impl RegistryConfig {
    /// Location of the registry configuration file: `$HY_ASSOC_CONFIG_PATH` when set, otherwise
    /// `hyperion/assoc.toml` under `%APPDATA%` on Windows, or under `$XDG_CONFIG_HOME` (then
    /// `$HOME/.config`) elsewhere.
    pub fn default_path() -> PathBuf {
        if let Some(config_path) = std::env::var_os(ENV_ASSOC_CONFIG_PATH) {
            return config_path.into();
        }

        #[cfg(target_os = "windows")]
        let mut path: PathBuf = std::env::var_os("APPDATA").map(PathBuf::from).unwrap_or_default();

        #[cfg(not(target_os = "windows"))]
        let mut path: PathBuf = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_default();

        path.push(CONFIG_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        path
    }

    /// Check that the configuration can be used to build a registry.
    pub fn validate(&self) -> AssocResult<()> {
        if let Some(shards) = self.shard_amount {
            if shards <= 1 || !shards.is_power_of_two() {
                return Err(AssocError::InvalidConfig(format!(
                    "shard_amount must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }

        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(AssocError::InvalidConfig(format!(
                "initial_capacity must not exceed {}, got {}",
                MAX_INITIAL_CAPACITY, self.initial_capacity
            )));
        }

        Ok(())
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str, file: &str) -> AssocResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| AssocError::ConfigParseError {
                source: e,
                file: file.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> AssocResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    /// Save the configuration to a TOML file, creating parent directories as needed.
    pub fn save_to_toml(&self, path: &Path) -> AssocResult<()> {
        let toml_str = toml::to_string(self).map_err(|e| AssocError::ConfigSerializeError {
            source: e,
            file: path.display().to_string(),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
