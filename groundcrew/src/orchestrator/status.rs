//! Read-only controller snapshot.
//!
//! The dispatcher is the only writer; it republishes the snapshot after
//! every input it handles. Readers never block the dispatcher for longer
//! than a clone.

use std::sync::{Arc, RwLock};

use crate::config::AircraftConfig;
use crate::gsx::{PerService, PushbackProgress, ServiceState};
use crate::telemetry::MovementFlags;

/// Shared status handle for read-only access.
pub type SharedStatus = Arc<RwLock<ControllerStatus>>;

/// A snapshot of the controller for diagnostics and UIs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerStatus {
    pub system_activated: bool,
    pub addon_running: bool,
    pub aircraft_title: String,
    pub capability: String,
    pub config: AircraftConfig,
    pub generation: u64,
    pub states: PerService<ServiceState>,
    pub pushback_progress: PushbackProgress,
    pub completed: PerService<bool>,
    pub in_flight: PerService<bool>,
    pub conditions: PerService<bool>,
    pub turnaround_active: bool,
    pub turnaround_pending: bool,
    pub pushback_attempted: bool,
    pub movement: MovementFlags,
}

impl ControllerStatus {
    /// Services currently marked completed, by name.
    pub fn completed_services(&self) -> Vec<&'static str> {
        self.completed
            .iter()
            .filter(|(_, done)| **done)
            .map(|(kind, _)| kind.name())
            .collect()
    }
}
