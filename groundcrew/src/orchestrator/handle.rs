//! Public entry point to a running engine.
//!
//! [`EngineHandle::spawn`] builds a [`Controller`], starts it on the current
//! Tokio runtime and hands back a cheap interface for pushing inputs,
//! subscribing to events and reading status.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::controller::{Controller, ControllerParts};
use super::event::{ControllerInput, EngineEvent};
use super::status::{ControllerStatus, SharedStatus};
use crate::aircraft::{CapabilityFrame, CapabilityRegistry};
use crate::config::{AircraftConfigStore, OrchestratorSettings};
use crate::gsx::{ServiceProtocol, SimBridge};
use crate::telemetry::AircraftFrame;

/// Capacity of the observability event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running orchestration engine.
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<ControllerInput>,
    events: broadcast::Sender<EngineEvent>,
    status: SharedStatus,
    protocol: Arc<ServiceProtocol>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Start an engine on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(
        bridge: Arc<dyn SimBridge>,
        configs: Arc<dyn AircraftConfigStore>,
        registry: CapabilityRegistry,
        settings: OrchestratorSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let controller = Controller::new(
            rx,
            events.clone(),
            ControllerParts {
                bridge,
                configs,
                registry,
                settings,
            },
        );
        let status = controller.status_handle();
        let protocol = controller.protocol();
        let shutdown = CancellationToken::new();

        let controller_shutdown = shutdown.clone();
        let task = Some(tokio::spawn(async move {
            controller.run(controller_shutdown).await;
        }));

        Self {
            tx,
            events,
            status,
            protocol,
            shutdown,
            task,
        }
    }

    /// Push an input. Returns false if the engine has stopped.
    pub fn send(&self, input: ControllerInput) -> bool {
        self.tx.send(input).is_ok()
    }

    pub fn aircraft_frame(&self, frame: AircraftFrame) -> bool {
        self.send(ControllerInput::AircraftFrame(frame))
    }

    pub fn addon_frame(&self, fields: Vec<f64>) -> bool {
        self.send(ControllerInput::AddonFrame(fields))
    }

    pub fn aircraft_loaded(&self, path: impl Into<String>) -> bool {
        self.send(ControllerInput::AircraftLoaded { path: path.into() })
    }

    pub fn capability_frame(&self, frame: CapabilityFrame) -> bool {
        self.send(ControllerInput::CapabilityFrame(frame))
    }

    pub fn toggle_activation(&self) -> bool {
        self.send(ControllerInput::ActivationSignal)
    }

    pub fn activation_variable(&self, name: impl Into<String>, value: f64) -> bool {
        self.send(ControllerInput::ActivationVariable {
            name: name.into(),
            value,
        })
    }

    pub fn reset_session(&self) -> bool {
        self.send(ControllerInput::ResetSession)
    }

    pub fn toggle_moved_flag(&self) -> bool {
        self.send(ControllerInput::ToggleMovedFlag)
    }

    pub fn dump_state(&self) -> bool {
        self.send(ControllerInput::DumpState)
    }

    /// Subscribe to observability events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Clone of the latest status snapshot.
    pub fn status(&self) -> ControllerStatus {
        self.status.read().unwrap().clone()
    }

    pub fn status_handle(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    /// The protocol state machine owned by the engine.
    pub fn protocol(&self) -> Arc<ServiceProtocol> {
        Arc::clone(&self.protocol)
    }

    /// Returns true if the dispatcher is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the dispatcher and wait for it to exit.
    ///
    /// Request tasks already running finish their menu writes on their own.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("running", &self.is_running())
            .finish()
    }
}
