//! Service protocol state machine.
//!
//! [`ServiceProtocol`] keeps the last known state of every service, turns fresh
//! addon snapshots into [`ProtocolEvent`]s, and performs the scripted menu
//! protocol that requests a service.
//!
//! # State tracking
//!
//! Every decoded value is authoritative. A change event fires whenever the new
//! value differs from the stored one, with no inference of skipped
//! intermediate states. Snapshots that fail to decode are dropped and the
//! previous state is kept.
//!
//! # Requests
//!
//! ```text
//! CloseMenu ─1.5s─▶ OpenMenu ─1.5s─▶ SelectOption(n) ─1.5s─▶ HandlingOperator ─1.5s─▶ CloseMenu
//! ```
//!
//! A successful request only means the script was written; confirmation
//! arrives later as a state change.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::bridge::{SimBridge, TransportError, VAR_MENU_CHOICE, VAR_MENU_OPEN};
use super::script::{MenuScript, MenuStep};
use super::state::{AddonSnapshot, PerService, PushbackProgress, ServiceKind, ServiceState};

/// Events raised while applying addon snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolEvent {
    AddonStarted,
    AddonStopped,
    ServiceStateChanged {
        kind: ServiceKind,
        state: ServiceState,
    },
}

/// Errors from requesting a service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("{kind} is not callable (current state: {state})")]
    NotCallable {
        kind: ServiceKind,
        state: ServiceState,
    },

    #[error("{kind} script aborted at step {step}: {source}")]
    Transport {
        kind: ServiceKind,
        step: usize,
        #[source]
        source: TransportError,
    },
}

#[derive(Debug, Default)]
struct ProtocolState {
    running: bool,
    states: PerService<ServiceState>,
    pushback_progress: PushbackProgress,
    menu_open: bool,
    menu_choice: i64,
    /// Handling operator chosen during the current addon session.
    operator_selected: bool,
}

/// Ground-service protocol state machine.
pub struct ServiceProtocol {
    state: Mutex<ProtocolState>,
    bridge: Arc<dyn SimBridge>,
    step_delay: Duration,
}

impl ServiceProtocol {
    /// Create a protocol machine writing through `bridge`, pausing
    /// `step_delay` after each scripted menu action.
    pub fn new(bridge: Arc<dyn SimBridge>, step_delay: Duration) -> Self {
        Self {
            state: Mutex::new(ProtocolState::default()),
            bridge,
            step_delay,
        }
    }

    /// Decode and apply one raw addon snapshot.
    ///
    /// Malformed snapshots are logged and dropped.
    pub fn update(&self, fields: &[f64]) -> Vec<ProtocolEvent> {
        match AddonSnapshot::decode(fields) {
            Ok(snapshot) => self.apply(&snapshot),
            Err(e) => {
                warn!(error = %e, "Dropping malformed addon snapshot");
                Vec::new()
            }
        }
    }

    /// Apply a decoded snapshot, returning the resulting events in order.
    pub fn apply(&self, snapshot: &AddonSnapshot) -> Vec<ProtocolEvent> {
        let mut state = self.state.lock().unwrap();
        let mut events = Vec::new();

        if snapshot.running != state.running {
            state.running = snapshot.running;
            if snapshot.running {
                info!(outcome = "success", "Ground-service addon is running");
                events.push(ProtocolEvent::AddonStarted);
            } else {
                warn!("Ground-service addon stopped");
                state.operator_selected = false;
                events.push(ProtocolEvent::AddonStopped);
            }
        }

        for kind in ServiceKind::ALL {
            let new_state = snapshot.states[kind];
            if new_state != state.states[kind] {
                state.states[kind] = new_state;
                log_state_change(kind, new_state);
                events.push(ProtocolEvent::ServiceStateChanged {
                    kind,
                    state: new_state,
                });
            }
        }

        state.pushback_progress = snapshot.pushback_progress;
        state.menu_open = snapshot.menu_open;
        state.menu_choice = snapshot.menu_choice;

        events
    }

    pub fn state(&self, kind: ServiceKind) -> ServiceState {
        self.state.lock().unwrap().states[kind]
    }

    pub fn states(&self) -> PerService<ServiceState> {
        self.state.lock().unwrap().states
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    pub fn pushback_progress(&self) -> PushbackProgress {
        self.state.lock().unwrap().pushback_progress
    }

    pub fn handling_operator_selected(&self) -> bool {
        self.state.lock().unwrap().operator_selected
    }

    /// Request a service by running its menu script.
    ///
    /// Fails immediately, without touching the addon, unless the service is
    /// currently callable. A transport failure aborts the remaining steps;
    /// writes already issued stay issued.
    pub async fn request(&self, kind: ServiceKind) -> Result<(), RequestError> {
        let current = self.state(kind);
        if current != ServiceState::Callable {
            warn!(%kind, state = %current, "Service not available");
            return Err(RequestError::NotCallable {
                kind,
                state: current,
            });
        }

        info!(%kind, "Requesting service");
        let script = MenuScript::for_service(kind);
        let steps = script.steps();

        for (index, step) in steps.iter().enumerate() {
            if let Err(source) = self.perform(*step) {
                warn!(%kind, step = index, error = %source, "Menu script aborted");
                return Err(RequestError::Transport {
                    kind,
                    step: index,
                    source,
                });
            }
            if index + 1 < steps.len() {
                tokio::time::sleep(self.step_delay).await;
            }
        }

        debug!(%kind, "Menu script sent");
        Ok(())
    }

    fn perform(&self, step: MenuStep) -> Result<(), TransportError> {
        match step {
            MenuStep::OpenMenu => self.bridge.write_variable(VAR_MENU_OPEN, 1.0),
            MenuStep::CloseMenu => self.bridge.write_variable(VAR_MENU_OPEN, 0.0),
            MenuStep::SelectOption(option) => self
                .bridge
                .write_variable(VAR_MENU_CHOICE, MenuStep::choice_value(option)),
            MenuStep::SelectHandlingOperator => {
                let mut state = self.state.lock().unwrap();
                if state.operator_selected {
                    debug!("Handling operator already selected, skipping");
                    return Ok(());
                }
                self.bridge
                    .write_variable(VAR_MENU_CHOICE, MenuStep::choice_value(1))?;
                state.operator_selected = true;
                Ok(())
            }
        }
    }
}

fn log_state_change(kind: ServiceKind, state: ServiceState) {
    match state {
        ServiceState::Active => info!(outcome = "success", %kind, "Service active"),
        ServiceState::Completed => info!(outcome = "success", %kind, "Service completed"),
        ServiceState::Bypassed if kind != ServiceKind::Pushback => {}
        _ => debug!(%kind, %state, "Service state changed"),
    }
}
