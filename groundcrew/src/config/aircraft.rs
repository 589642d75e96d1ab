//! Per-aircraft configuration.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use super::defaults::{DEFAULT_ACTIVATION_VALUE, DEFAULT_TURNAROUND_DELAY_SECS};

/// Service policy for one aircraft title.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftConfig {
    /// Refuel before boarding is requested
    pub refuel_before_boarding: bool,
    /// Request catering before the first deboarding completes
    pub catering_on_new_flight: bool,
    /// Request catering once turnaround starts
    pub catering_on_turnaround: bool,
    /// Call refueling and catering as soon as turnaround starts
    pub auto_call_turnaround_services: bool,
    /// Delay between deboarding completion and turnaround
    pub turnaround_delay_seconds: u64,
    /// Close doors and remove ground equipment before pushback and after boarding
    pub auto_close_doors: bool,
    /// Cockpit variable that toggles automation for this aircraft
    pub activation_variable: Option<String>,
    /// Value of `activation_variable` that counts as a toggle
    pub activation_value: f64,
}

impl Default for AircraftConfig {
    fn default() -> Self {
        Self {
            refuel_before_boarding: true,
            catering_on_new_flight: false,
            catering_on_turnaround: false,
            auto_call_turnaround_services: true,
            turnaround_delay_seconds: DEFAULT_TURNAROUND_DELAY_SECS,
            auto_close_doors: true,
            activation_variable: None,
            activation_value: DEFAULT_ACTIVATION_VALUE,
        }
    }
}

/// Lookup and storage of per-aircraft configuration.
pub trait AircraftConfigStore: Send + Sync {
    /// Configuration for `title`, created with defaults on first use.
    fn aircraft_config(&self, title: &str) -> AircraftConfig;

    fn save_aircraft_config(&self, title: &str, config: AircraftConfig);
}

/// Thread-safe in-memory configuration store.
#[derive(Debug, Default)]
pub struct InMemoryAircraftConfigs {
    configs: Mutex<HashMap<String, AircraftConfig>>,
}

impl InMemoryAircraftConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with known aircraft.
    pub fn with_configs(configs: impl IntoIterator<Item = (String, AircraftConfig)>) -> Self {
        Self {
            configs: Mutex::new(configs.into_iter().collect()),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.configs.lock().unwrap().keys().cloned().collect();
        titles.sort();
        titles
    }

    pub fn contains(&self, title: &str) -> bool {
        self.configs.lock().unwrap().contains_key(title)
    }
}

impl AircraftConfigStore for InMemoryAircraftConfigs {
    fn aircraft_config(&self, title: &str) -> AircraftConfig {
        let mut configs = self.configs.lock().unwrap();
        configs
            .entry(title.to_string())
            .or_insert_with(|| {
                info!(aircraft = title, "Creating default configuration for new aircraft");
                AircraftConfig::default()
            })
            .clone()
    }

    fn save_aircraft_config(&self, title: &str, config: AircraftConfig) {
        self.configs
            .lock()
            .unwrap()
            .insert(title.to_string(), config);
    }
}
