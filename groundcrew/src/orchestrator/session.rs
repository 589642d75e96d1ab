//! Per-flight session state.
//!
//! One [`SessionState`] is live at a time. A reset replaces it wholesale and
//! bumps the generation counter so timers and request tasks started in an
//! earlier session can tell their results are stale.

use std::time::Duration;

use tokio::time::Instant;

use super::decision::BlockReason;
use crate::gsx::{PerService, ServiceKind};
use crate::telemetry::MovementFlags;

/// Orchestration state for one flight session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Incremented on every reset.
    pub generation: u64,
    pub completed: PerService<bool>,
    pub last_trigger: PerService<Option<Instant>>,
    pub turnaround_active: bool,
    pub movement: MovementFlags,
    /// Pushback is requested at most once per session.
    pub pushback_attempted: bool,
    /// Last blocked reason logged per service, for log deduplication.
    pub blocked_logged: PerService<Option<BlockReason>>,
    /// Services already completed at activation have been recorded.
    pub initial_states_synced: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every field with its initial value and advance the generation.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation.wrapping_add(1),
            ..Self::default()
        };
    }

    /// Time left before `kind` may trigger again, if any.
    pub fn cooldown_remaining(
        &self,
        kind: ServiceKind,
        now: Instant,
        cooldown: Duration,
    ) -> Option<Duration> {
        let last = self.last_trigger[kind]?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }

    pub fn mark_triggered(&mut self, kind: ServiceKind, now: Instant) {
        self.last_trigger[kind] = Some(now);
        self.blocked_logged[kind] = None;
    }

    /// Record a blocked reason, returning true if it differs from the last
    /// one recorded for `kind`.
    pub fn note_blocked(&mut self, kind: ServiceKind, reason: BlockReason) -> bool {
        if self.blocked_logged[kind] == Some(reason) {
            return false;
        }
        self.blocked_logged[kind] = Some(reason);
        true
    }

    /// Clear completion for the services reopened by a turnaround.
    pub fn reopen_for_turnaround(&mut self) {
        self.turnaround_active = true;
        for kind in [
            ServiceKind::Boarding,
            ServiceKind::Refueling,
            ServiceKind::Catering,
        ] {
            self.completed[kind] = false;
            self.blocked_logged[kind] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_everything_but_generation() {
        let now = Instant::now();
        let mut session = SessionState::new();
        session.completed[ServiceKind::Boarding] = true;
        session.mark_triggered(ServiceKind::Pushback, now);
        session.turnaround_active = true;
        session.pushback_attempted = true;
        session.movement.engines_have_run = true;
        session.movement.aircraft_has_moved = true;
        session.note_blocked(ServiceKind::Boarding, BlockReason::AircraftMoved);
        session.initial_states_synced = true;

        session.reset();

        assert_eq!(session.generation, 1);
        assert_eq!(
            session,
            SessionState {
                generation: 1,
                ..SessionState::default()
            }
        );
        for kind in ServiceKind::ALL {
            assert!(!session.completed[kind]);
            assert!(session
                .cooldown_remaining(kind, now, Duration::from_secs(30))
                .is_none());
        }
    }

    #[test]
    fn test_cooldown_remaining() {
        let start = Instant::now();
        let cooldown = Duration::from_secs(30);
        let mut session = SessionState::new();
        assert!(session
            .cooldown_remaining(ServiceKind::Boarding, start, cooldown)
            .is_none());

        session.mark_triggered(ServiceKind::Boarding, start);
        assert_eq!(
            session.cooldown_remaining(ServiceKind::Boarding, start + Duration::from_secs(10), cooldown),
            Some(Duration::from_secs(20))
        );
        assert!(session
            .cooldown_remaining(ServiceKind::Boarding, start + cooldown, cooldown)
            .is_none());
        // Other services are independent
        assert!(session
            .cooldown_remaining(ServiceKind::Refueling, start, cooldown)
            .is_none());
    }

    #[test]
    fn test_note_blocked_deduplicates() {
        let mut session = SessionState::new();
        assert!(session.note_blocked(ServiceKind::Boarding, BlockReason::AircraftMoved));
        assert!(!session.note_blocked(ServiceKind::Boarding, BlockReason::AircraftMoved));
        assert!(session.note_blocked(ServiceKind::Boarding, BlockReason::AlreadyCompleted));
        assert!(session.note_blocked(ServiceKind::Refueling, BlockReason::AircraftMoved));
    }

    #[test]
    fn test_reopen_for_turnaround() {
        let mut session = SessionState::new();
        for kind in ServiceKind::ALL {
            session.completed[kind] = true;
        }
        session.reopen_for_turnaround();

        assert!(session.turnaround_active);
        assert!(session.completed[ServiceKind::Deboarding]);
        assert!(session.completed[ServiceKind::Pushback]);
        assert!(!session.completed[ServiceKind::Boarding]);
        assert!(!session.completed[ServiceKind::Refueling]);
        assert!(!session.completed[ServiceKind::Catering]);
    }
}
