//! Automation on/off signal handling.
//!
//! Activation arrives either as an explicit signal (a hotkey) or as an
//! aircraft-specific cockpit variable reaching a configured value. Both go
//! through [`ActivationMonitor`], which absorbs duplicate edges arriving
//! within the debounce window.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Prefix of local simulator variables.
const LOCAL_VARIABLE_PREFIX: &str = "L:";

/// Add the `L:` prefix unless the name already carries a variable prefix.
pub fn normalize_variable_name(name: &str) -> String {
    let name = name.trim();
    if name.len() > 2 && name.as_bytes()[1] == b':' {
        name.to_string()
    } else {
        format!("{LOCAL_VARIABLE_PREFIX}{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ArmedVariable {
    name: String,
    target: f64,
    previous: Option<f64>,
}

/// Tracks the activation flag and the armed activation variable.
#[derive(Debug)]
pub struct ActivationMonitor {
    activated: bool,
    debounce: Duration,
    last_toggle: Option<Instant>,
    armed: Option<ArmedVariable>,
}

impl ActivationMonitor {
    pub fn new(debounce: Duration) -> Self {
        Self {
            activated: false,
            debounce,
            last_toggle: None,
            armed: None,
        }
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Flip the activation flag.
    ///
    /// Returns the new value, or `None` when the signal arrived inside the
    /// debounce window of the previous toggle.
    pub fn toggle(&mut self, now: Instant) -> Option<bool> {
        if let Some(last) = self.last_toggle {
            if now.saturating_duration_since(last) < self.debounce {
                debug!("Ignoring duplicate activation signal");
                return None;
            }
        }
        self.last_toggle = Some(now);
        self.activated = !self.activated;
        Some(self.activated)
    }

    /// Watch `name` for `target`. Returns the normalised variable name.
    pub fn arm(&mut self, name: &str, target: f64) -> String {
        let name = normalize_variable_name(name);
        self.armed = Some(ArmedVariable {
            name: name.clone(),
            target,
            previous: None,
        });
        name
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn armed_variable(&self) -> Option<&str> {
        self.armed.as_ref().map(|armed| armed.name.as_str())
    }

    /// Feed a value of a watched variable.
    ///
    /// Returns true when the value just became equal to the target. The first
    /// value after arming only seeds the previous value.
    pub fn observe(&mut self, name: &str, value: f64) -> bool {
        let Some(armed) = self.armed.as_mut() else {
            return false;
        };
        if normalize_variable_name(name) != armed.name {
            return false;
        }

        let previous = armed.previous.replace(value);
        match previous {
            None => {
                debug!(variable = %armed.name, value, "Activation variable initial value");
                false
            }
            Some(previous) => value == armed.target && previous != armed.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_variable_name() {
        assert_eq!(normalize_variable_name("SWITCH_GSX"), "L:SWITCH_GSX");
        assert_eq!(normalize_variable_name("L:SWITCH_GSX"), "L:SWITCH_GSX");
        assert_eq!(normalize_variable_name(" A:LIGHT BEACON "), "A:LIGHT BEACON");
    }

    #[test]
    fn test_toggle_debounce() {
        let start = Instant::now();
        let mut monitor = ActivationMonitor::new(Duration::from_millis(300));

        assert_eq!(monitor.toggle(start), Some(true));
        assert_eq!(monitor.toggle(start + Duration::from_millis(100)), None);
        assert!(monitor.is_activated());
        assert_eq!(monitor.toggle(start + Duration::from_millis(400)), Some(false));
        assert!(!monitor.is_activated());
    }

    #[test]
    fn test_first_value_only_seeds() {
        let mut monitor = ActivationMonitor::new(Duration::from_millis(300));
        monitor.arm("SWITCH_GSX", 1.0);

        assert!(!monitor.observe("L:SWITCH_GSX", 1.0));
        assert!(!monitor.observe("L:SWITCH_GSX", 1.0));
        assert!(!monitor.observe("L:SWITCH_GSX", 0.0));
        assert!(monitor.observe("SWITCH_GSX", 1.0));
    }

    #[test]
    fn test_unarmed_or_other_variable_ignored() {
        let mut monitor = ActivationMonitor::new(Duration::from_millis(300));
        assert!(!monitor.observe("L:SWITCH_GSX", 1.0));

        monitor.arm("SWITCH_GSX", 1.0);
        monitor.observe("L:SWITCH_GSX", 0.0);
        assert!(!monitor.observe("L:OTHER", 1.0));

        monitor.disarm();
        assert!(!monitor.observe("L:SWITCH_GSX", 1.0));
        assert!(monitor.armed_variable().is_none());
    }
}
