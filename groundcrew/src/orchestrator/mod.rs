//! Orchestration engine.
//!
//! Decides when to request each ground service and reacts to completions.
//!
//! - [`session`] - per-flight session state
//! - [`decision`] - pure trigger decisions
//! - [`activation`] - activation toggle and activation variable
//! - [`worker`] - per-service request locks and the menu lock
//! - [`controller`] - the single dispatcher task
//! - [`handle`] - public handle to a running engine
//! - [`status`] - shared read-only snapshot
//!
//! # Usage
//!
//! ```ignore
//! use groundcrew::orchestrator::EngineHandle;
//!
//! let engine = EngineHandle::spawn(bridge, configs, registry, settings);
//! engine.toggle_activation();
//! engine.addon_frame(fields);
//! engine.aircraft_frame(frame);
//! ```

mod activation;
mod controller;
mod decision;
mod event;
mod handle;
mod request;
mod session;
mod status;
mod worker;

pub use activation::{normalize_variable_name, ActivationMonitor};
pub use controller::{Controller, ControllerParts};
pub use decision::{should_trigger, BlockReason, Decision, DecisionInputs};
pub use event::{ControllerInput, EngineEvent};
pub use handle::EngineHandle;
pub use session::SessionState;
pub use status::{ControllerStatus, SharedStatus};
pub use worker::{MenuPermit, ServiceLocks, ServicePermit};
