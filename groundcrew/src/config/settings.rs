//! Engine tunables.

use std::time::Duration;

/// Timing and threshold settings for the orchestration engine.
///
/// Loaded from the `[orchestrator]` section of config.ini; see
/// [`super::defaults`] for the default of each field.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Minimum time between two triggers of the same service
    pub trigger_cooldown: Duration,
    /// Pause between a trigger decision and the start of its menu script
    pub trigger_delay: Duration,
    /// Pause after each scripted menu action
    pub menu_step_delay: Duration,
    /// Wait after the pushback script before checking its effect
    pub pushback_settle_delay: Duration,
    /// Number of door polls before pushback proceeds anyway
    pub door_poll_attempts: u32,
    pub door_poll_interval: Duration,
    /// Wait after boarding completes before closing doors
    pub boarding_door_close_delay: Duration,
    /// Window in which repeated activation signals are ignored
    pub activation_debounce: Duration,
    pub movement_threshold_knots: f64,
    pub stationary_threshold_knots: f64,
}
