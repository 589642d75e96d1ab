//! Aircraft-specific door and ground-equipment operations.
//!
//! Each aircraft family provides an [`AircraftCapability`]. The orchestrator
//! only ever talks to the trait; aircraft without a dedicated implementation
//! get [`NullCapability`], whose operations do nothing.

mod registry;

pub use registry::CapabilityRegistry;

/// Raw aircraft-specific telemetry forwarded to the active capability.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapabilityFrame {
    /// Identifies which data definition the values belong to.
    pub source: String,
    pub values: Vec<f64>,
}

/// Errors raised by aircraft capabilities.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("failed to connect {aircraft} capability: {reason}")]
    ConnectFailed { aircraft: String, reason: String },
}

/// Door and ground-equipment operations for one aircraft family.
///
/// Implementations are called from the dispatcher and from request tasks, so
/// operations must be cheap and must not block.
pub trait AircraftCapability: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Called once when the capability is selected for a newly loaded aircraft.
    fn connect(&self) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn on_telemetry_update(&self, _frame: &CapabilityFrame) {}

    fn any_doors_open(&self) -> bool {
        false
    }

    fn close_open_doors(&self) {}

    fn remove_ground_equipment(&self) {}

    /// Called when a different aircraft is loaded.
    fn dispose(&self) {}
}

/// Capability used when no aircraft-specific implementation matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCapability;

impl AircraftCapability for NullCapability {
    fn name(&self) -> &str {
        "none"
    }
}
