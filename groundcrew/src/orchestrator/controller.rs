//! Orchestration controller.
//!
//! The [`Controller`] is a single dispatcher task. Every input, timer and
//! request result arrives on a channel and is handled one at a time, so the
//! session state has exactly one writer and handlers never race each other.
//!
//! ```text
//! ControllerInput ──┐                       ┌──▶ RequestTask (per service)
//!                   ├──▶ Controller::run ───┤        │
//! InternalEvent ────┘        │              └──▶ timers (turnaround, cooldown)
//!        ▲                   ▼                        │
//!        │            SharedStatus / EngineEvent      │
//!        └────────────────────────────────────────────┘
//! ```
//!
//! Triggers are evaluated on edges only: a telemetry condition becoming met,
//! a service state change, the addon starting, activation, reset and
//! turnaround. A decision blocked only by cooldown schedules its own
//! re-evaluation.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::activation::ActivationMonitor;
use super::decision::{should_trigger, Decision, DecisionInputs};
use super::event::{ControllerInput, EngineEvent, InternalEvent, ScriptOutcome};
use super::request::{spawn_boarding_door_close, RequestTask};
use super::session::SessionState;
use super::status::{ControllerStatus, SharedStatus};
use super::worker::ServiceLocks;
use crate::aircraft::{AircraftCapability, CapabilityRegistry, NullCapability};
use crate::config::{AircraftConfig, AircraftConfigStore, OrchestratorSettings};
use crate::gsx::{PerService, ProtocolEvent, ServiceKind, ServiceProtocol, ServiceState, SimBridge};
use crate::telemetry::{AircraftFrame, ConditionEvaluator};

/// Services auto-called when a turnaround starts.
const TURNAROUND_SERVICES: [ServiceKind; 2] = [ServiceKind::Refueling, ServiceKind::Catering];

/// Collaborators the controller is built from.
pub struct ControllerParts {
    pub bridge: Arc<dyn SimBridge>,
    pub configs: Arc<dyn AircraftConfigStore>,
    pub registry: CapabilityRegistry,
    pub settings: OrchestratorSettings,
}

/// The orchestration dispatcher.
pub struct Controller {
    inputs: mpsc::UnboundedReceiver<ControllerInput>,
    internal_tx: mpsc::UnboundedSender<InternalEvent>,
    internal_rx: mpsc::UnboundedReceiver<InternalEvent>,
    events: broadcast::Sender<EngineEvent>,
    status: SharedStatus,

    protocol: Arc<ServiceProtocol>,
    bridge: Arc<dyn SimBridge>,
    configs: Arc<dyn AircraftConfigStore>,
    registry: CapabilityRegistry,
    capability: Arc<dyn AircraftCapability>,
    settings: OrchestratorSettings,

    evaluator: ConditionEvaluator,
    activation: ActivationMonitor,
    locks: ServiceLocks,
    session: SessionState,
    aircraft_title: String,
    config: AircraftConfig,
    conditions: PerService<bool>,
    reevaluation_scheduled: PerService<bool>,
    turnaround_pending: bool,
}

impl Controller {
    pub fn new(
        inputs: mpsc::UnboundedReceiver<ControllerInput>,
        events: broadcast::Sender<EngineEvent>,
        parts: ControllerParts,
    ) -> Self {
        let ControllerParts {
            bridge,
            configs,
            registry,
            settings,
        } = parts;
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let protocol = Arc::new(ServiceProtocol::new(
            Arc::clone(&bridge),
            settings.menu_step_delay,
        ));

        Self {
            inputs,
            internal_tx,
            internal_rx,
            events,
            status: Arc::new(RwLock::new(ControllerStatus::default())),
            protocol,
            bridge,
            configs,
            registry,
            capability: Arc::new(NullCapability),
            evaluator: ConditionEvaluator::new(
                settings.movement_threshold_knots,
                settings.stationary_threshold_knots,
            ),
            activation: ActivationMonitor::new(settings.activation_debounce),
            settings,
            locks: ServiceLocks::new(),
            session: SessionState::new(),
            aircraft_title: String::new(),
            config: AircraftConfig::default(),
            conditions: PerService::default(),
            reevaluation_scheduled: PerService::default(),
            turnaround_pending: false,
        }
    }

    /// Returns a handle to the shared status snapshot.
    pub fn status_handle(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    /// Returns the protocol state machine driven by this controller.
    pub fn protocol(&self) -> Arc<ServiceProtocol> {
        Arc::clone(&self.protocol)
    }

    /// Runs the dispatcher until shutdown is signaled or all input senders
    /// are dropped.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Orchestration controller starting");
        self.publish_status();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Orchestration controller shutting down");
                    break;
                }

                Some(event) = self.internal_rx.recv() => {
                    self.handle_internal(event);
                }

                input = self.inputs.recv() => match input {
                    Some(input) => self.handle_input(input),
                    None => {
                        debug!("All controller inputs closed");
                        break;
                    }
                },
            }

            self.publish_status();
        }

        self.capability.dispose();
        debug!("Orchestration controller stopped");
    }

    fn handle_input(&mut self, input: ControllerInput) {
        match input {
            ControllerInput::AircraftFrame(frame) => self.on_aircraft_frame(frame),
            ControllerInput::AddonFrame(fields) => self.on_addon_frame(&fields),
            ControllerInput::AircraftLoaded { path } => self.on_aircraft_loaded(&path),
            ControllerInput::CapabilityFrame(frame) => self.capability.on_telemetry_update(&frame),
            ControllerInput::ActivationSignal => self.toggle_activation(),
            ControllerInput::ActivationVariable { name, value } => {
                if self.activation.observe(&name, value) {
                    debug!(variable = %name, value, "Activation variable reached target");
                    self.toggle_activation();
                }
            }
            ControllerInput::ResetSession => {
                self.reset_session("manual reset");
                self.evaluate_all();
            }
            ControllerInput::ToggleMovedFlag => {
                let moved = !self.session.movement.aircraft_has_moved;
                self.session.movement.aircraft_has_moved = moved;
                info!(moved, "Aircraft moved flag toggled");
                self.evaluate_all();
            }
            ControllerInput::DumpState => self.dump_state(),
        }
    }

    fn handle_internal(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::TurnaroundElapsed { generation } => {
                if generation == self.session.generation {
                    self.on_turnaround_elapsed();
                } else {
                    debug!(generation, "Ignoring turnaround timer from previous session");
                }
            }
            InternalEvent::Reevaluate { kind, generation } => {
                if generation == self.session.generation {
                    self.reevaluation_scheduled[kind] = false;
                    self.evaluate(kind, false);
                }
            }
            InternalEvent::ScriptFinished {
                kind,
                generation,
                outcome,
            } => self.on_script_finished(kind, generation, outcome),
        }
    }

    // =========================================================================
    // Telemetry
    // =========================================================================

    fn on_aircraft_frame(&mut self, frame: AircraftFrame) {
        if !frame.title.is_empty() && frame.title != self.aircraft_title {
            self.on_aircraft_changed(&frame.title);
        }

        let pushback_completed = self.session.completed[ServiceKind::Pushback];
        let evaluation =
            self.evaluator
                .evaluate(&frame, &mut self.session.movement, pushback_completed);
        self.conditions = evaluation.conditions;

        for kind in ServiceKind::ALL {
            if evaluation.rising[kind] {
                debug!(%kind, "Conditions met");
                self.evaluate(kind, false);
            }
        }
    }

    fn on_aircraft_changed(&mut self, title: &str) {
        if !self.aircraft_title.is_empty() {
            info!(from = %self.aircraft_title, to = title, "Aircraft changed");
            self.reset_session("aircraft changed");
        } else {
            info!(aircraft = title, "Aircraft detected");
        }

        self.aircraft_title = title.to_string();
        self.config = self.configs.aircraft_config(title);
        self.arm_activation_variable();
        self.publish(EngineEvent::AircraftChanged {
            title: title.to_string(),
        });
    }

    fn arm_activation_variable(&mut self) {
        let Some(variable) = self.config.activation_variable.clone() else {
            self.activation.disarm();
            return;
        };

        let name = self.activation.arm(&variable, self.config.activation_value);
        match self.bridge.watch_variable(&name) {
            Ok(()) => info!(
                variable = %name,
                value = self.config.activation_value,
                "Watching activation variable"
            ),
            Err(e) => warn!(variable = %name, error = %e, "Failed to watch activation variable"),
        }
    }

    fn on_aircraft_loaded(&mut self, path: &str) {
        self.capability.dispose();

        let capability = self.registry.select(path);
        if let Err(e) = capability.connect() {
            warn!(error = %e, "Aircraft capability unavailable, door automation disabled");
            self.capability = Arc::new(NullCapability);
            return;
        }
        info!(path, capability = capability.name(), "Aircraft loaded");
        self.capability = capability;
    }

    // =========================================================================
    // Addon state
    // =========================================================================

    fn on_addon_frame(&mut self, fields: &[f64]) {
        let events = self.protocol.update(fields);
        if events.is_empty() {
            return;
        }

        for event in events {
            match event {
                ProtocolEvent::AddonStarted => self.publish(EngineEvent::AddonRunningChanged(true)),
                ProtocolEvent::AddonStopped => {
                    self.publish(EngineEvent::AddonRunningChanged(false))
                }
                ProtocolEvent::ServiceStateChanged { kind, state } => {
                    self.publish(EngineEvent::ServiceStateChanged { kind, state });
                    self.on_service_state(kind, state);
                }
            }
        }

        self.evaluate_all();
    }

    fn on_service_state(&mut self, kind: ServiceKind, state: ServiceState) {
        match state {
            ServiceState::Requested => info!(outcome = "success", %kind, "Service requested"),
            ServiceState::Completed => self.on_service_completed(kind),
            _ => {}
        }
    }

    fn on_service_completed(&mut self, kind: ServiceKind) {
        if self.session.completed[kind] {
            debug!(%kind, "Ignoring repeated completion");
            return;
        }
        self.session.completed[kind] = true;
        debug!(%kind, "Recorded completion");

        match kind {
            ServiceKind::Deboarding => {
                if self.activation.is_activated() {
                    self.start_turnaround();
                } else {
                    debug!("Turnaround starts once automation is activated");
                }
            }
            ServiceKind::Boarding => {
                if self.activation.is_activated() && self.config.auto_close_doors {
                    spawn_boarding_door_close(
                        Arc::clone(&self.capability),
                        self.settings.boarding_door_close_delay,
                    );
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Turnaround
    // =========================================================================

    fn start_turnaround(&mut self) {
        if self.turnaround_pending || self.session.turnaround_active {
            return;
        }
        self.turnaround_pending = true;

        let delay_secs = self.config.turnaround_delay_seconds;
        if self.config.auto_call_turnaround_services {
            info!(delay_secs, "Turnaround delay started, services will be called automatically");
        } else {
            info!(delay_secs, "Turnaround delay started");
        }
        self.publish(EngineEvent::TurnaroundStarted { delay_secs });

        let generation = self.session.generation;
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            let _ = tx.send(InternalEvent::TurnaroundElapsed { generation });
        });
    }

    fn on_turnaround_elapsed(&mut self) {
        self.turnaround_pending = false;
        self.session.reopen_for_turnaround();
        self.publish(EngineEvent::TurnaroundActive);

        if self.config.auto_call_turnaround_services {
            info!(outcome = "success", "Turnaround services starting now");
            for kind in TURNAROUND_SERVICES {
                self.evaluate(kind, true);
            }
        } else {
            info!(outcome = "success", "Turnaround services now available");
        }

        self.evaluate_all();
    }

    // =========================================================================
    // Activation and session
    // =========================================================================

    fn toggle_activation(&mut self) {
        let Some(activated) = self.activation.toggle(Instant::now()) else {
            return;
        };

        if activated {
            info!(outcome = "success", "Ground-service automation activated");
        } else {
            info!("Ground-service automation deactivated");
        }
        self.publish(EngineEvent::SystemActivatedChanged(activated));

        if activated {
            self.sync_initial_states();
            if self.session.completed[ServiceKind::Deboarding] {
                self.start_turnaround();
            }
            self.evaluate_all();
        }
    }

    /// Record services the addon already reports completed, once per session.
    fn sync_initial_states(&mut self) {
        if self.session.initial_states_synced {
            return;
        }
        self.session.initial_states_synced = true;

        let states = self.protocol.states();
        for kind in ServiceKind::ALL {
            if states[kind] == ServiceState::Completed && !self.session.completed[kind] {
                debug!(%kind, "Service already completed at activation");
                self.session.completed[kind] = true;
            }
        }
    }

    fn reset_session(&mut self, reason: &str) {
        self.session.reset();
        self.evaluator.reset_edges();
        self.reevaluation_scheduled = PerService::default();
        self.turnaround_pending = false;
        info!(
            outcome = "success",
            reason,
            generation = self.session.generation,
            "Session reset"
        );
        self.publish(EngineEvent::SessionReset);
    }

    // =========================================================================
    // Decisions
    // =========================================================================

    fn evaluate_all(&mut self) {
        for kind in ServiceKind::ALL {
            self.evaluate(kind, false);
        }
    }

    /// Decide on `kind` and act on the decision. `force_condition` skips the
    /// telemetry condition for turnaround auto-calls.
    fn evaluate(&mut self, kind: ServiceKind, force_condition: bool) {
        let decision = {
            let inputs = DecisionInputs {
                system_activated: self.activation.is_activated(),
                addon_running: self.protocol.is_running(),
                in_flight: self.locks.is_busy(kind),
                condition_met: force_condition || self.conditions[kind],
                states: self.protocol.states(),
                pushback_progress: self.protocol.pushback_progress(),
                session: &self.session,
                config: &self.config,
                now: Instant::now(),
                cooldown: self.settings.trigger_cooldown,
            };
            should_trigger(kind, &inputs)
        };

        match decision {
            Decision::Trigger => self.launch(kind),
            Decision::CoolingDown(remaining) => self.schedule_reevaluation(kind, remaining),
            Decision::Blocked(reason) => {
                if reason.is_noteworthy() && self.session.note_blocked(kind, reason) {
                    debug!(%kind, %reason, "Service blocked");
                }
            }
        }
    }

    fn launch(&mut self, kind: ServiceKind) {
        let Some(permit) = self.locks.try_acquire(kind) else {
            debug!(%kind, "Request already in flight");
            return;
        };

        self.session.mark_triggered(kind, Instant::now());
        if kind == ServiceKind::Pushback {
            self.session.pushback_attempted = true;
        }
        info!(%kind, aircraft = %self.aircraft_title, "Trigger conditions met");
        self.publish(EngineEvent::ServiceRequested(kind));

        RequestTask {
            kind,
            generation: self.session.generation,
            protocol: Arc::clone(&self.protocol),
            capability: Arc::clone(&self.capability),
            settings: self.settings.clone(),
            auto_close_doors: self.config.auto_close_doors,
            locks: self.locks.clone(),
            reply: self.internal_tx.clone(),
        }
        .spawn(permit);
    }

    fn schedule_reevaluation(&mut self, kind: ServiceKind, after: Duration) {
        if self.reevaluation_scheduled[kind] {
            return;
        }
        self.reevaluation_scheduled[kind] = true;
        debug!(%kind, remaining_ms = after.as_millis() as u64, "Cooling down");

        let generation = self.session.generation;
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(InternalEvent::Reevaluate { kind, generation });
        });
    }

    fn on_script_finished(&mut self, kind: ServiceKind, generation: u64, outcome: ScriptOutcome) {
        if generation != self.session.generation {
            // The permit is free again, so the new session may want it
            debug!(%kind, generation, "Ignoring request result from previous session");
            self.evaluate(kind, false);
            return;
        }

        match outcome {
            ScriptOutcome::Sent => debug!(%kind, "Request script finished"),
            ScriptOutcome::NoTransition => {
                warn!(%kind, "Pushback did not start, aircraft is likely not at a gate");
                self.session.completed[kind] = true;
            }
            ScriptOutcome::Failed(reason) => warn!(%kind, %reason, "Request failed"),
        }

        self.evaluate(kind, false);
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    fn publish(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn publish_status(&self) {
        let status = ControllerStatus {
            system_activated: self.activation.is_activated(),
            addon_running: self.protocol.is_running(),
            aircraft_title: self.aircraft_title.clone(),
            capability: self.capability.name().to_string(),
            config: self.config.clone(),
            generation: self.session.generation,
            states: self.protocol.states(),
            pushback_progress: self.protocol.pushback_progress(),
            completed: self.session.completed,
            in_flight: PerService::from_fn(|kind| self.locks.is_busy(kind)),
            conditions: self.conditions,
            turnaround_active: self.session.turnaround_active,
            turnaround_pending: self.turnaround_pending,
            pushback_attempted: self.session.pushback_attempted,
            movement: self.session.movement,
        };
        *self.status.write().unwrap() = status;
    }

    fn dump_state(&self) {
        let states = self.protocol.states();
        info!(
            activated = self.activation.is_activated(),
            addon_running = self.protocol.is_running(),
            aircraft = %self.aircraft_title,
            capability = self.capability.name(),
            generation = self.session.generation,
            "Controller state"
        );
        info!(
            engines_have_run = self.session.movement.engines_have_run,
            aircraft_has_moved = self.session.movement.aircraft_has_moved,
            turnaround_active = self.session.turnaround_active,
            turnaround_pending = self.turnaround_pending,
            pushback_attempted = self.session.pushback_attempted,
            pushback_progress = self.protocol.pushback_progress().0,
            "Session flags"
        );
        for kind in ServiceKind::ALL {
            info!(
                %kind,
                state = %states[kind],
                completed = self.session.completed[kind],
                condition = self.conditions[kind],
                in_flight = self.locks.is_busy(kind),
                "Service"
            );
        }
        info!(config = ?self.config, "Aircraft configuration");
    }
}
