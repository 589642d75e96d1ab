//! Request tasks.
//!
//! Every trigger spawns one [`RequestTask`]. It owns the service permit for
//! its whole lifetime, waits the trigger delay, takes the menu lock, runs
//! the menu script and reports back to the dispatcher with a [`ScriptOutcome`] tagged with the
//! session generation it was started in.
//!
//! Pushback additionally prepares the aircraft first:
//!
//! ```text
//! doors open? ──yes──▶ close doors ─▶ remove equipment ─▶ poll doors (N × interval)
//!      │                                                          │
//!      no                                                         ▼
//!      └──────────────────────────────────────────────▶ request ─▶ settle ─▶ check state
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event::{InternalEvent, ScriptOutcome};
use super::worker::{ServiceLocks, ServicePermit};
use crate::aircraft::AircraftCapability;
use crate::config::OrchestratorSettings;
use crate::gsx::{ServiceKind, ServiceProtocol, ServiceState};

pub(crate) struct RequestTask {
    pub kind: ServiceKind,
    pub generation: u64,
    pub protocol: Arc<ServiceProtocol>,
    pub capability: Arc<dyn AircraftCapability>,
    pub settings: OrchestratorSettings,
    pub auto_close_doors: bool,
    pub locks: ServiceLocks,
    pub reply: mpsc::UnboundedSender<InternalEvent>,
}

impl RequestTask {
    /// Run the request on its own task.
    pub fn spawn(self, permit: ServicePermit) {
        tokio::spawn(async move {
            let outcome = self.run().await;
            drop(permit);
            let _ = self.reply.send(InternalEvent::ScriptFinished {
                kind: self.kind,
                generation: self.generation,
                outcome,
            });
        });
    }

    async fn run(&self) -> ScriptOutcome {
        tokio::time::sleep(self.settings.trigger_delay).await;

        if self.kind == ServiceKind::Pushback {
            self.prepare_for_pushback().await;
        }

        let menu = self.locks.acquire_menu().await;
        let result = self.protocol.request(self.kind).await;
        drop(menu);
        if let Err(e) = result {
            return ScriptOutcome::Failed(e.to_string());
        }

        if self.kind != ServiceKind::Pushback {
            return ScriptOutcome::Sent;
        }

        tokio::time::sleep(self.settings.pushback_settle_delay).await;
        if self.protocol.state(ServiceKind::Pushback) == ServiceState::Callable {
            ScriptOutcome::NoTransition
        } else {
            ScriptOutcome::Sent
        }
    }

    async fn prepare_for_pushback(&self) {
        if !self.auto_close_doors || !self.capability.any_doors_open() {
            return;
        }

        info!(
            aircraft = self.capability.name(),
            "Closing doors and removing ground equipment before pushback"
        );
        self.capability.close_open_doors();
        self.capability.remove_ground_equipment();

        let closed = wait_for_doors(
            self.capability.as_ref(),
            self.settings.door_poll_attempts,
            self.settings.door_poll_interval,
        )
        .await;
        if closed {
            debug!("Doors closed");
        } else {
            warn!(
                attempts = self.settings.door_poll_attempts,
                "Doors still open, requesting pushback anyway"
            );
        }
    }
}

/// Poll until every door reports closed. Returns false on timeout.
async fn wait_for_doors(
    capability: &dyn AircraftCapability,
    attempts: u32,
    interval: Duration,
) -> bool {
    for _ in 0..attempts {
        if !capability.any_doors_open() {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    !capability.any_doors_open()
}

/// Close doors after boarding, once the configured delay has passed.
pub(crate) fn spawn_boarding_door_close(capability: Arc<dyn AircraftCapability>, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if capability.any_doors_open() {
            info!(aircraft = capability.name(), "Closing doors after boarding");
        }
        capability.close_open_doors();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Doors that report open for a fixed number of polls after closing starts.
    struct SlowDoors {
        polls_until_closed: AtomicU32,
    }

    impl AircraftCapability for SlowDoors {
        fn name(&self) -> &str {
            "slow-doors"
        }

        fn any_doors_open(&self) -> bool {
            let remaining = self.polls_until_closed.load(Ordering::SeqCst);
            if remaining == 0 {
                return false;
            }
            self.polls_until_closed.store(remaining - 1, Ordering::SeqCst);
            true
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_doors_closes() {
        let doors = SlowDoors {
            polls_until_closed: AtomicU32::new(3),
        };
        let start = tokio::time::Instant::now();
        assert!(wait_for_doors(&doors, 120, Duration::from_millis(500)).await);
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_doors_times_out() {
        let doors = SlowDoors {
            polls_until_closed: AtomicU32::new(u32::MAX),
        };
        let start = tokio::time::Instant::now();
        assert!(!wait_for_doors(&doors, 4, Duration::from_millis(500)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
