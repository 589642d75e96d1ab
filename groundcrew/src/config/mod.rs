//! Configuration for the orchestration engine.
//!
//! - [`AircraftConfig`] and [`AircraftConfigStore`] hold per-aircraft policy
//! - [`OrchestratorSettings`] holds engine timings and thresholds
//! - [`ConfigFile`] loads both from `~/.groundcrew/config.ini`

mod aircraft;
mod defaults;
mod file;
mod parser;
mod settings;

pub use aircraft::{AircraftConfig, AircraftConfigStore, InMemoryAircraftConfigs};
pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use settings::OrchestratorSettings;
