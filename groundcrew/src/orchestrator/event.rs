//! Controller inputs and outputs.
//!
//! [`ControllerInput`] is everything the outside world pushes into the
//! engine. [`EngineEvent`] is what the engine publishes back for UIs and
//! logs; nothing in the engine depends on who listens.

use crate::aircraft::CapabilityFrame;
use crate::gsx::{ServiceKind, ServiceState};
use crate::telemetry::AircraftFrame;

/// Inputs accepted by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerInput {
    /// Sampled aircraft state (~1 Hz).
    AircraftFrame(AircraftFrame),
    /// Raw 9-field ground-service addon record.
    AddonFrame(Vec<f64>),
    /// A new aircraft was loaded from `path`.
    AircraftLoaded { path: String },
    /// Aircraft-specific telemetry for the active capability.
    CapabilityFrame(CapabilityFrame),
    /// Hotkey or other external activation toggle.
    ActivationSignal,
    /// Value of a watched activation variable.
    ActivationVariable { name: String, value: f64 },
    ResetSession,
    /// Manually flip the "aircraft has moved" flag.
    ToggleMovedFlag,
    /// Log the full controller state.
    DumpState,
}

/// Outcome reported by a request task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScriptOutcome {
    /// The script was written to the addon.
    Sent,
    /// Pushback script ran but the service stayed callable.
    NoTransition,
    Failed(String),
}

/// Messages the dispatcher sends to itself from timers and tasks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InternalEvent {
    TurnaroundElapsed {
        generation: u64,
    },
    Reevaluate {
        kind: ServiceKind,
        generation: u64,
    },
    ScriptFinished {
        kind: ServiceKind,
        generation: u64,
        outcome: ScriptOutcome,
    },
}

/// Observability events published by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SystemActivatedChanged(bool),
    AddonRunningChanged(bool),
    ServiceStateChanged {
        kind: ServiceKind,
        state: ServiceState,
    },
    /// A menu script for `kind` was started.
    ServiceRequested(ServiceKind),
    /// Deboarding completed and the turnaround delay started.
    TurnaroundStarted {
        delay_secs: u64,
    },
    /// The turnaround delay elapsed.
    TurnaroundActive,
    SessionReset,
    AircraftChanged {
        title: String,
    },
}
