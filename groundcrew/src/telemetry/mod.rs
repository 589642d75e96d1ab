//! Aircraft telemetry and trigger conditions.
//!
//! The transport delivers an [`AircraftFrame`] about once a second. The
//! [`ConditionEvaluator`] turns each frame into one "conditions met" flag per
//! service, latches the movement flags, and reports which conditions rose
//! since the previous frame so the orchestrator only re-decides on edges.
//!
//! | Service | Condition |
//! |---------|-----------|
//! | Deboarding | beacon off, parking brake set, on ground, stationary |
//! | Boarding / Refueling / Catering | engines off, beacon off, on ground, stationary |
//! | Pushback | beacon on, parking brake set, engines off, on ground, stationary, engines never ran |

use tracing::{debug, info};

use crate::gsx::{PerService, ServiceKind};

/// Raw aircraft state pushed by the transport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AircraftFrame {
    pub beacon: bool,
    pub parking_brake: bool,
    pub engine_running: bool,
    pub on_ground: bool,
    pub ground_speed_knots: f64,
    pub airspeed_knots: f64,
    pub title: String,
}

/// Flags latched from telemetry for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementFlags {
    pub engines_have_run: bool,
    pub aircraft_has_moved: bool,
}

/// Result of evaluating one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Conditions currently met.
    pub conditions: PerService<bool>,
    /// Conditions that became met with this frame.
    pub rising: PerService<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Switches {
    beacon: bool,
    parking_brake: bool,
    engine_running: bool,
}

/// Converts aircraft frames into per-service trigger conditions.
#[derive(Debug)]
pub struct ConditionEvaluator {
    movement_threshold_knots: f64,
    stationary_threshold_knots: f64,
    previous_switches: Option<Switches>,
    previous_conditions: PerService<bool>,
}

impl ConditionEvaluator {
    pub fn new(movement_threshold_knots: f64, stationary_threshold_knots: f64) -> Self {
        Self {
            movement_threshold_knots,
            stationary_threshold_knots,
            previous_switches: None,
            previous_conditions: PerService::default(),
        }
    }

    /// Evaluate a frame, updating the latched movement flags in place.
    ///
    /// `pushback_completed` lets ground movement after a pushback count as
    /// movement even before the engines were observed running.
    pub fn evaluate(
        &mut self,
        frame: &AircraftFrame,
        flags: &mut MovementFlags,
        pushback_completed: bool,
    ) -> Evaluation {
        self.log_switch_changes(frame);

        if frame.engine_running && !flags.engines_have_run {
            debug!("Engines have run this session");
            flags.engines_have_run = true;
        }
        if (flags.engines_have_run || pushback_completed)
            && frame.ground_speed_knots > self.movement_threshold_knots
            && !flags.aircraft_has_moved
        {
            debug!(
                ground_speed = frame.ground_speed_knots,
                "Aircraft has moved this session"
            );
            flags.aircraft_has_moved = true;
        }

        let engines_off = !frame.engine_running;
        let stationary = frame.ground_speed_knots < self.stationary_threshold_knots;
        let parked = frame.on_ground && stationary;

        let servicing = engines_off && !frame.beacon && parked;
        let mut conditions = PerService::default();
        conditions[ServiceKind::Deboarding] = !frame.beacon && frame.parking_brake && parked;
        conditions[ServiceKind::Boarding] = servicing;
        conditions[ServiceKind::Refueling] = servicing;
        conditions[ServiceKind::Catering] = servicing;
        conditions[ServiceKind::Pushback] = frame.beacon
            && frame.parking_brake
            && engines_off
            && parked
            && !flags.engines_have_run;

        let rising =
            PerService::from_fn(|kind| conditions[kind] && !self.previous_conditions[kind]);
        self.previous_conditions = conditions;

        Evaluation { conditions, rising }
    }

    /// Conditions from the most recent frame.
    pub fn current(&self) -> PerService<bool> {
        self.previous_conditions
    }

    /// Forget previous conditions so the next frame reports fresh edges.
    pub fn reset_edges(&mut self) {
        self.previous_conditions = PerService::default();
    }

    fn log_switch_changes(&mut self, frame: &AircraftFrame) {
        let switches = Switches {
            beacon: frame.beacon,
            parking_brake: frame.parking_brake,
            engine_running: frame.engine_running,
        };
        match self.previous_switches {
            None => debug!(
                beacon = switches.beacon,
                parking_brake = switches.parking_brake,
                engines = switches.engine_running,
                "Initial aircraft state"
            ),
            Some(previous) => {
                if previous.beacon != switches.beacon {
                    info!(on = switches.beacon, "Beacon light changed");
                }
                if previous.parking_brake != switches.parking_brake {
                    info!(set = switches.parking_brake, "Parking brake changed");
                }
                if previous.engine_running != switches.engine_running {
                    info!(running = switches.engine_running, "Engine state changed");
                }
            }
        }
        self.previous_switches = Some(switches);
    }
}
