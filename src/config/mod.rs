//! Application configuration: where the store lives and how values are
//! displayed.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Persisted user configuration, JSON on disk, defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the default store base directory when set.
    pub store_dir: Option<PathBuf>,
    pub autosave: bool,
    pub backup_retention: usize,
    pub currency_symbol: String,
    pub display_precision: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: None,
            autosave: true,
            backup_retention: 5,
            currency_symbol: "$".into(),
            display_precision: 2,
        }
    }
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join("config.json")))
    }

    /// Manager rooted at the platform config directory.
    pub fn default_location() -> Self {
        let base = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("costplan");
        Self::new(base.join("config.json"))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    /// Loads the config, quietly falling back to defaults on any failure.
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|err| {
            tracing::warn!("could not read config ({err}); using defaults");
            Config::default()
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = self.config_path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_loads_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn config_round_trips_through_disk() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            store_dir: Some(temp.path().join("store")),
            autosave: false,
            backup_retention: 9,
            currency_symbol: "€".into(),
            display_precision: 0,
        };
        manager.save(&config).expect("save config");
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.config_path(), "{ nope").unwrap();
        assert_eq!(manager.load_or_default(), Config::default());
    }
}
