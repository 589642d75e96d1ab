//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`config`] - Show the effective configuration
//! - [`replay`] - Drive the engine from a scenario file

pub mod config;
pub mod replay;
