//! Default values for engine tunables and per-aircraft settings.

use std::time::Duration;

use super::settings::OrchestratorSettings;

/// Minimum time between two triggers of the same service.
pub const DEFAULT_TRIGGER_COOLDOWN_SECS: u64 = 30;

/// Pause between deciding to trigger and starting the menu script.
pub const DEFAULT_TRIGGER_DELAY_MS: u64 = 1000;

/// Pause after each scripted menu action.
pub const DEFAULT_MENU_STEP_DELAY_MS: u64 = 1500;

/// Wait after the pushback script before checking whether it took effect.
pub const DEFAULT_PUSHBACK_SETTLE_DELAY_MS: u64 = 2000;

/// Door polls before pushback gives up waiting.
pub const DEFAULT_DOOR_POLL_ATTEMPTS: u32 = 120;

pub const DEFAULT_DOOR_POLL_INTERVAL_MS: u64 = 500;

/// Wait after boarding completes before closing doors.
pub const DEFAULT_BOARDING_DOOR_CLOSE_DELAY_MS: u64 = 2000;

/// Window in which repeated activation signals are ignored.
pub const DEFAULT_ACTIVATION_DEBOUNCE_MS: u64 = 300;

/// Ground speed above which an aircraft counts as having moved.
pub const DEFAULT_MOVEMENT_THRESHOLD_KNOTS: f64 = 5.0;

/// Ground speed below which an aircraft counts as stationary.
pub const DEFAULT_STATIONARY_THRESHOLD_KNOTS: f64 = 0.5;

pub const DEFAULT_TURNAROUND_DELAY_SECS: u64 = 120;

pub const DEFAULT_ACTIVATION_VALUE: f64 = 1.0;

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            trigger_cooldown: Duration::from_secs(DEFAULT_TRIGGER_COOLDOWN_SECS),
            trigger_delay: Duration::from_millis(DEFAULT_TRIGGER_DELAY_MS),
            menu_step_delay: Duration::from_millis(DEFAULT_MENU_STEP_DELAY_MS),
            pushback_settle_delay: Duration::from_millis(DEFAULT_PUSHBACK_SETTLE_DELAY_MS),
            door_poll_attempts: DEFAULT_DOOR_POLL_ATTEMPTS,
            door_poll_interval: Duration::from_millis(DEFAULT_DOOR_POLL_INTERVAL_MS),
            boarding_door_close_delay: Duration::from_millis(DEFAULT_BOARDING_DOOR_CLOSE_DELAY_MS),
            activation_debounce: Duration::from_millis(DEFAULT_ACTIVATION_DEBOUNCE_MS),
            movement_threshold_knots: DEFAULT_MOVEMENT_THRESHOLD_KNOTS,
            stationary_threshold_knots: DEFAULT_STATIONARY_THRESHOLD_KNOTS,
        }
    }
}
