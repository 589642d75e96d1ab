//! Groundcrew - ground-service automation for flight simulators
//!
//! This library watches aircraft telemetry and a ground-service addon's
//! shared variables, and requests deboarding, refueling, catering, boarding
//! and pushback through the addon's menu at the right moments.
//!
//! # Architecture
//!
//! ```text
//! AircraftFrame ──▶ telemetry::ConditionEvaluator ──┐
//!                                                   ├──▶ orchestrator::Controller ──▶ gsx::ServiceProtocol ──▶ SimBridge
//! addon record ───▶ gsx::ServiceProtocol (states) ──┘              │
//!                                                                  └──▶ aircraft::AircraftCapability
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use groundcrew::aircraft::CapabilityRegistry;
//! use groundcrew::config::{ConfigFile, OrchestratorSettings};
//! use groundcrew::orchestrator::EngineHandle;
//!
//! let config = ConfigFile::load()?;
//! let engine = EngineHandle::spawn(
//!     bridge,
//!     Arc::new(config.aircraft_store()),
//!     CapabilityRegistry::new(),
//!     config.orchestrator,
//! );
//! engine.toggle_activation();
//! ```

pub mod aircraft;
pub mod config;
pub mod gsx;
pub mod logging;
pub mod orchestrator;
pub mod telemetry;

/// Crate version, for CLI banners and logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
