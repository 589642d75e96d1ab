//! Configuration file handling for ~/.groundcrew/config.ini.
//!
//! The file is read-only from this crate's point of view: missing files load
//! as defaults and nothing is ever written back. Parsing lives in
//! [`super::parser`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::aircraft::{AircraftConfig, InMemoryAircraftConfigs};
use super::settings::OrchestratorSettings;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Everything loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// `[orchestrator]` section
    pub orchestrator: OrchestratorSettings,
    /// `[aircraft:<title>]` sections keyed by title
    pub aircraft: BTreeMap<String, AircraftConfig>,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.groundcrew/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Seed an in-memory store with the configured aircraft.
    pub fn aircraft_store(&self) -> InMemoryAircraftConfigs {
        InMemoryAircraftConfigs::with_configs(
            self.aircraft
                .iter()
                .map(|(title, config)| (title.clone(), config.clone())),
        )
    }
}

/// Get the path to the config directory (~/.groundcrew).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".groundcrew")
}

/// Get the path to the config file (~/.groundcrew/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AircraftConfigStore;
    use std::time::Duration;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.orchestrator.trigger_cooldown, Duration::from_secs(30));
        assert!(config.aircraft.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(
            &config_path,
            "[orchestrator]\n\
             trigger_cooldown_secs = 15\n\
             \n\
             [aircraft:PMDG 737-800]\n\
             refuel_before_boarding = false\n\
             activation_variable = SWITCH_GSX\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.orchestrator.trigger_cooldown, Duration::from_secs(15));

        let store = config.aircraft_store();
        let aircraft = store.aircraft_config("PMDG 737-800");
        assert!(!aircraft.refuel_before_boarding);
        assert_eq!(aircraft.activation_variable.as_deref(), Some("SWITCH_GSX"));
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with(".groundcrew/config.ini"));
    }
}
