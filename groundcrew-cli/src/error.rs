//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use groundcrew::config::ConfigFileError;

use crate::replay::ReplayParseError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Failed to read a scenario file
    ReadScenario { path: PathBuf, error: std::io::Error },
    /// Scenario file has an invalid line
    Scenario { path: PathBuf, error: ReplayParseError },
    /// Failed to start the async runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Scenario { .. } => {
                eprintln!();
                eprintln!("Scenario lines look like:");
                eprintln!("  ACTIVATE");
                eprintln!("  ADDON,1,0,0,1,2,2,0,2,2");
                eprintln!("  AIRCRAFT,0,1,0,1,0.0,0.0,My Aircraft Title");
                eprintln!("  WAIT,10");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Check the file with: groundcrew config");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::ReadScenario { path, error } => {
                write!(f, "Failed to read scenario '{}': {}", path.display(), error)
            }
            CliError::Scenario { path, error } => {
                write!(f, "Invalid scenario '{}': {}", path.display(), error)
            }
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::ReadScenario { error, .. } => Some(error),
            CliError::Scenario { error, .. } => Some(error),
            CliError::Runtime(e) => Some(e),
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}
