//! Trigger decisions.
//!
//! [`should_trigger`] is a total function over a snapshot of everything the
//! controller knows: it returns a definite [`Decision`] for every input and
//! has no side effects. Guards run in a fixed order:
//!
//! ```text
//! activated → addon running → not in flight → condition met
//!           → service-specific guards → cooldown
//! ```
//!
//! Cooldown is checked last so that [`Decision::CoolingDown`] always means
//! "would trigger once the cooldown expires".

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::session::SessionState;
use crate::config::AircraftConfig;
use crate::gsx::{PerService, PushbackProgress, ServiceKind, ServiceState};

/// Why a service was not triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    NotActivated,
    AddonNotRunning,
    RequestInFlight,
    ConditionsNotMet,
    NotCallable(ServiceState),
    NeverFlown,
    AircraftMoved,
    AlreadyCompleted,
    AlreadyAttempted,
    AwaitingTurnaround,
    BoardingCompleted,
    DeboardingInProgress,
    DeboardingPending,
    BoardingInProgress,
    WaitingFor(ServiceKind),
    PushbackUnderway,
    DisabledForAircraft,
}

impl BlockReason {
    /// Reasons worth a debug line. The rest are the steady state of a
    /// parked or flying aircraft.
    pub fn is_noteworthy(self) -> bool {
        !matches!(
            self,
            BlockReason::NotActivated
                | BlockReason::AddonNotRunning
                | BlockReason::ConditionsNotMet
                | BlockReason::NotCallable(_)
                | BlockReason::DisabledForAircraft
                | BlockReason::RequestInFlight
        )
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::NotActivated => write!(f, "automation not activated"),
            BlockReason::AddonNotRunning => write!(f, "ground-service addon not running"),
            BlockReason::RequestInFlight => write!(f, "request already in flight"),
            BlockReason::ConditionsNotMet => write!(f, "aircraft conditions not met"),
            BlockReason::NotCallable(state) => write!(f, "service state is {state}"),
            BlockReason::NeverFlown => write!(f, "aircraft has not flown this session"),
            BlockReason::AircraftMoved => write!(f, "aircraft has moved (flight completed)"),
            BlockReason::AlreadyCompleted => write!(f, "already completed"),
            BlockReason::AlreadyAttempted => write!(f, "already attempted this session"),
            BlockReason::AwaitingTurnaround => write!(f, "waiting for turnaround delay"),
            BlockReason::BoardingCompleted => write!(f, "boarding already completed"),
            BlockReason::DeboardingInProgress => write!(f, "deboarding is ongoing"),
            BlockReason::DeboardingPending => write!(f, "deboarding not yet done"),
            BlockReason::BoardingInProgress => write!(f, "boarding is ongoing"),
            BlockReason::WaitingFor(kind) => write!(f, "waiting for {kind} to finish"),
            BlockReason::PushbackUnderway => write!(f, "pushback already underway"),
            BlockReason::DisabledForAircraft => write!(f, "disabled for this aircraft"),
        }
    }
}

/// Outcome of evaluating one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Trigger,
    Blocked(BlockReason),
    /// Every guard passes but the service triggered too recently.
    CoolingDown(Duration),
}

/// Everything a decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub system_activated: bool,
    pub addon_running: bool,
    pub in_flight: bool,
    pub condition_met: bool,
    pub states: PerService<ServiceState>,
    pub pushback_progress: PushbackProgress,
    pub session: &'a SessionState,
    pub config: &'a AircraftConfig,
    pub now: Instant,
    pub cooldown: Duration,
}

/// Decide whether `kind` should be requested now.
pub fn should_trigger(kind: ServiceKind, inputs: &DecisionInputs<'_>) -> Decision {
    if !inputs.system_activated {
        return Decision::Blocked(BlockReason::NotActivated);
    }
    if !inputs.addon_running {
        return Decision::Blocked(BlockReason::AddonNotRunning);
    }
    if inputs.in_flight {
        return Decision::Blocked(BlockReason::RequestInFlight);
    }
    if !inputs.condition_met {
        return Decision::Blocked(BlockReason::ConditionsNotMet);
    }

    let guard = match kind {
        ServiceKind::Deboarding => deboarding_guard(inputs),
        ServiceKind::Boarding => boarding_guard(inputs),
        ServiceKind::Refueling => refueling_guard(inputs),
        ServiceKind::Catering => catering_guard(inputs),
        ServiceKind::Pushback => pushback_guard(inputs),
    };
    if let Err(reason) = guard {
        return Decision::Blocked(reason);
    }

    match inputs
        .session
        .cooldown_remaining(kind, inputs.now, inputs.cooldown)
    {
        Some(remaining) => Decision::CoolingDown(remaining),
        None => Decision::Trigger,
    }
}

type Guard = Result<(), BlockReason>;

fn require_callable(inputs: &DecisionInputs<'_>, kind: ServiceKind) -> Guard {
    match inputs.states[kind] {
        ServiceState::Callable => Ok(()),
        other => Err(BlockReason::NotCallable(other)),
    }
}

fn require_not_moved(inputs: &DecisionInputs<'_>) -> Guard {
    if inputs.session.movement.aircraft_has_moved {
        Err(BlockReason::AircraftMoved)
    } else {
        Ok(())
    }
}

/// Deboarding or a turnaround leg still waiting out its delay.
fn awaiting_turnaround(session: &SessionState) -> bool {
    session.completed[ServiceKind::Deboarding] && !session.turnaround_active
}

/// A prerequisite blocks while it is underway, or while it is callable but
/// not yet done. Services the addon never reports are not waited on.
fn prerequisite_pending(inputs: &DecisionInputs<'_>, kind: ServiceKind) -> bool {
    match inputs.states[kind] {
        ServiceState::Active | ServiceState::Requested => true,
        ServiceState::Callable => !inputs.session.completed[kind],
        _ => false,
    }
}

fn deboarding_guard(inputs: &DecisionInputs<'_>) -> Guard {
    let movement = inputs.session.movement;
    if !movement.engines_have_run && !movement.aircraft_has_moved {
        return Err(BlockReason::NeverFlown);
    }
    require_callable(inputs, ServiceKind::Deboarding)
}

fn boarding_guard(inputs: &DecisionInputs<'_>) -> Guard {
    let session = inputs.session;
    let config = inputs.config;

    require_not_moved(inputs)?;
    if session.completed[ServiceKind::Boarding] {
        return Err(BlockReason::AlreadyCompleted);
    }
    if awaiting_turnaround(session) {
        return Err(BlockReason::AwaitingTurnaround);
    }
    if inputs.states[ServiceKind::Deboarding].is_in_progress() {
        return Err(BlockReason::DeboardingInProgress);
    }
    if inputs.states[ServiceKind::Deboarding] == ServiceState::Callable
        && !session.completed[ServiceKind::Deboarding]
        && session.movement.engines_have_run
    {
        return Err(BlockReason::DeboardingPending);
    }

    if config.refuel_before_boarding && prerequisite_pending(inputs, ServiceKind::Refueling) {
        return Err(BlockReason::WaitingFor(ServiceKind::Refueling));
    }
    let deboarded = session.completed[ServiceKind::Deboarding];
    let catering_expected = if deboarded {
        config.catering_on_turnaround
    } else {
        config.catering_on_new_flight
    };
    if catering_expected && prerequisite_pending(inputs, ServiceKind::Catering) {
        return Err(BlockReason::WaitingFor(ServiceKind::Catering));
    }

    require_callable(inputs, ServiceKind::Boarding)
}

fn refueling_guard(inputs: &DecisionInputs<'_>) -> Guard {
    let session = inputs.session;

    require_not_moved(inputs)?;
    if session.completed[ServiceKind::Refueling] {
        return Err(BlockReason::AlreadyCompleted);
    }
    if session.completed[ServiceKind::Boarding] {
        return Err(BlockReason::BoardingCompleted);
    }
    if awaiting_turnaround(session) {
        return Err(BlockReason::AwaitingTurnaround);
    }
    if !inputs.config.refuel_before_boarding {
        return Err(BlockReason::DisabledForAircraft);
    }
    require_callable(inputs, ServiceKind::Refueling)
}

fn catering_guard(inputs: &DecisionInputs<'_>) -> Guard {
    let session = inputs.session;
    let config = inputs.config;

    require_not_moved(inputs)?;
    if session.completed[ServiceKind::Catering] {
        return Err(BlockReason::AlreadyCompleted);
    }
    if session.completed[ServiceKind::Boarding] {
        return Err(BlockReason::BoardingCompleted);
    }

    let deboarded = session.completed[ServiceKind::Deboarding];
    if !deboarded {
        if !config.catering_on_new_flight {
            return Err(BlockReason::DisabledForAircraft);
        }
    } else {
        if !config.catering_on_turnaround {
            return Err(BlockReason::DisabledForAircraft);
        }
        if !session.turnaround_active {
            return Err(BlockReason::AwaitingTurnaround);
        }
    }

    require_callable(inputs, ServiceKind::Catering)
}

fn pushback_guard(inputs: &DecisionInputs<'_>) -> Guard {
    let session = inputs.session;

    require_not_moved(inputs)?;
    if session.completed[ServiceKind::Pushback] {
        return Err(BlockReason::AlreadyCompleted);
    }
    if session.pushback_attempted {
        return Err(BlockReason::AlreadyAttempted);
    }
    require_callable(inputs, ServiceKind::Pushback)?;
    if inputs.pushback_progress.is_underway() {
        return Err(BlockReason::PushbackUnderway);
    }
    if inputs.states[ServiceKind::Boarding].is_in_progress() {
        return Err(BlockReason::BoardingInProgress);
    }
    if inputs.states[ServiceKind::Deboarding].is_in_progress() {
        return Err(BlockReason::DeboardingInProgress);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        session: SessionState,
        config: AircraftConfig,
        states: PerService<ServiceState>,
        pushback_progress: PushbackProgress,
        now: Instant,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                session: SessionState::new(),
                config: AircraftConfig {
                    refuel_before_boarding: false,
                    ..AircraftConfig::default()
                },
                states: PerService::from_fn(|_| ServiceState::Callable),
                pushback_progress: PushbackProgress(0),
                now: Instant::now(),
            }
        }

        fn decide(&self, kind: ServiceKind) -> Decision {
            let inputs = DecisionInputs {
                system_activated: true,
                addon_running: true,
                in_flight: false,
                condition_met: true,
                states: self.states,
                pushback_progress: self.pushback_progress,
                session: &self.session,
                config: &self.config,
                now: self.now,
                cooldown: Duration::from_secs(30),
            };
            should_trigger(kind, &inputs)
        }
    }

    #[test]
    fn test_common_guards() {
        let fixture = Fixture::new();
        let base = DecisionInputs {
            system_activated: true,
            addon_running: true,
            in_flight: false,
            condition_met: true,
            states: fixture.states,
            pushback_progress: fixture.pushback_progress,
            session: &fixture.session,
            config: &fixture.config,
            now: fixture.now,
            cooldown: Duration::from_secs(30),
        };
        let kind = ServiceKind::Boarding;

        assert_eq!(should_trigger(kind, &base), Decision::Trigger);
        assert_eq!(
            should_trigger(kind, &DecisionInputs { system_activated: false, ..base }),
            Decision::Blocked(BlockReason::NotActivated)
        );
        assert_eq!(
            should_trigger(kind, &DecisionInputs { addon_running: false, ..base }),
            Decision::Blocked(BlockReason::AddonNotRunning)
        );
        assert_eq!(
            should_trigger(kind, &DecisionInputs { in_flight: true, ..base }),
            Decision::Blocked(BlockReason::RequestInFlight)
        );
        assert_eq!(
            should_trigger(kind, &DecisionInputs { condition_met: false, ..base }),
            Decision::Blocked(BlockReason::ConditionsNotMet)
        );
    }

    #[test]
    fn test_cooldown_reported_only_when_otherwise_clear() {
        let mut fixture = Fixture::new();
        fixture
            .session
            .mark_triggered(ServiceKind::Boarding, fixture.now);
        fixture.now += Duration::from_secs(10);

        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::CoolingDown(Duration::from_secs(20))
        );

        fixture.states[ServiceKind::Boarding] = ServiceState::Active;
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::NotCallable(ServiceState::Active))
        );
    }

    #[test]
    fn test_deboarding_requires_flight() {
        let mut fixture = Fixture::new();
        assert_eq!(
            fixture.decide(ServiceKind::Deboarding),
            Decision::Blocked(BlockReason::NeverFlown)
        );

        fixture.session.movement.engines_have_run = true;
        assert_eq!(fixture.decide(ServiceKind::Deboarding), Decision::Trigger);

        fixture.session.movement = Default::default();
        fixture.session.movement.aircraft_has_moved = true;
        assert_eq!(fixture.decide(ServiceKind::Deboarding), Decision::Trigger);
    }

    #[test]
    fn test_boarding_never_triggers_during_deboarding() {
        let mut fixture = Fixture::new();
        for state in [ServiceState::Active, ServiceState::Requested] {
            fixture.states[ServiceKind::Deboarding] = state;
            assert_eq!(
                fixture.decide(ServiceKind::Boarding),
                Decision::Blocked(BlockReason::DeboardingInProgress)
            );
        }
    }

    #[test]
    fn test_boarding_waits_for_pending_deboarding_after_flight() {
        let mut fixture = Fixture::new();
        fixture.session.movement.engines_have_run = true;
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::DeboardingPending)
        );
    }

    #[test]
    fn test_boarding_blocked_until_turnaround() {
        let mut fixture = Fixture::new();
        fixture.states[ServiceKind::Deboarding] = ServiceState::Completed;
        fixture.session.completed[ServiceKind::Deboarding] = true;
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::AwaitingTurnaround)
        );

        fixture.session.reopen_for_turnaround();
        assert_eq!(fixture.decide(ServiceKind::Boarding), Decision::Trigger);
    }

    #[test]
    fn test_boarding_blocked_when_moved_or_completed() {
        let mut fixture = Fixture::new();
        fixture.session.completed[ServiceKind::Boarding] = true;
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::AlreadyCompleted)
        );

        fixture.session.movement.aircraft_has_moved = true;
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::AircraftMoved)
        );
    }

    #[test]
    fn test_boarding_prerequisites() {
        let mut fixture = Fixture::new();
        fixture.config.refuel_before_boarding = true;

        // Callable but not done
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::WaitingFor(ServiceKind::Refueling))
        );

        fixture.states[ServiceKind::Refueling] = ServiceState::Active;
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::WaitingFor(ServiceKind::Refueling))
        );

        // Never reported by the addon
        fixture.states[ServiceKind::Refueling] = ServiceState::Unknown;
        assert_eq!(fixture.decide(ServiceKind::Boarding), Decision::Trigger);

        fixture.states[ServiceKind::Refueling] = ServiceState::Completed;
        fixture.config.catering_on_new_flight = true;
        assert_eq!(
            fixture.decide(ServiceKind::Boarding),
            Decision::Blocked(BlockReason::WaitingFor(ServiceKind::Catering))
        );

        fixture.session.completed[ServiceKind::Catering] = true;
        assert_eq!(fixture.decide(ServiceKind::Boarding), Decision::Trigger);
    }

    #[test]
    fn test_refueling_policy() {
        let mut fixture = Fixture::new();
        assert_eq!(
            fixture.decide(ServiceKind::Refueling),
            Decision::Blocked(BlockReason::DisabledForAircraft)
        );

        fixture.config.refuel_before_boarding = true;
        assert_eq!(fixture.decide(ServiceKind::Refueling), Decision::Trigger);

        fixture.session.completed[ServiceKind::Boarding] = true;
        assert_eq!(
            fixture.decide(ServiceKind::Refueling),
            Decision::Blocked(BlockReason::BoardingCompleted)
        );
    }

    #[test]
    fn test_catering_policies() {
        let mut fixture = Fixture::new();
        assert_eq!(
            fixture.decide(ServiceKind::Catering),
            Decision::Blocked(BlockReason::DisabledForAircraft)
        );

        fixture.config.catering_on_new_flight = true;
        assert_eq!(fixture.decide(ServiceKind::Catering), Decision::Trigger);

        // After deboarding only the turnaround policy applies
        fixture.session.completed[ServiceKind::Deboarding] = true;
        assert_eq!(
            fixture.decide(ServiceKind::Catering),
            Decision::Blocked(BlockReason::DisabledForAircraft)
        );

        fixture.config.catering_on_turnaround = true;
        assert_eq!(
            fixture.decide(ServiceKind::Catering),
            Decision::Blocked(BlockReason::AwaitingTurnaround)
        );

        fixture.session.reopen_for_turnaround();
        assert_eq!(fixture.decide(ServiceKind::Catering), Decision::Trigger);
    }

    #[test]
    fn test_pushback_blocked_while_underway() {
        let mut fixture = Fixture::new();
        fixture.states[ServiceKind::Boarding] = ServiceState::Completed;
        fixture.states[ServiceKind::Deboarding] = ServiceState::NotAvailable;
        assert_eq!(fixture.decide(ServiceKind::Pushback), Decision::Trigger);

        fixture.pushback_progress = PushbackProgress(3);
        assert_eq!(
            fixture.decide(ServiceKind::Pushback),
            Decision::Blocked(BlockReason::PushbackUnderway)
        );

        fixture.pushback_progress = PushbackProgress(5);
        assert_eq!(fixture.decide(ServiceKind::Pushback), Decision::Trigger);
    }

    #[test]
    fn test_pushback_at_most_once() {
        let mut fixture = Fixture::new();
        fixture.states[ServiceKind::Boarding] = ServiceState::Completed;
        fixture.session.pushback_attempted = true;
        assert_eq!(
            fixture.decide(ServiceKind::Pushback),
            Decision::Blocked(BlockReason::AlreadyAttempted)
        );
    }

    #[test]
    fn test_pushback_waits_for_boarding() {
        let mut fixture = Fixture::new();
        fixture.states[ServiceKind::Boarding] = ServiceState::Active;
        assert_eq!(
            fixture.decide(ServiceKind::Pushback),
            Decision::Blocked(BlockReason::BoardingInProgress)
        );
    }
}
