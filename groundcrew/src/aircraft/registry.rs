//! Ordered capability registry.
//!
//! Entries are `(predicate, factory)` pairs checked in registration order
//! against the loaded aircraft's path. The first match wins.

use std::sync::Arc;

use super::{AircraftCapability, NullCapability};

type Matcher = Box<dyn Fn(&str) -> bool + Send + Sync>;
type Factory = Box<dyn Fn() -> Arc<dyn AircraftCapability> + Send + Sync>;

/// Selects the capability for a loaded aircraft.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: Vec<(Matcher, Factory)>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability with an arbitrary predicate over the aircraft path.
    pub fn register<M, F>(&mut self, matches: M, factory: F) -> &mut Self
    where
        M: Fn(&str) -> bool + Send + Sync + 'static,
        F: Fn() -> Arc<dyn AircraftCapability> + Send + Sync + 'static,
    {
        self.entries.push((Box::new(matches), Box::new(factory)));
        self
    }

    /// Register a capability for paths containing `needle`, ignoring case.
    pub fn register_title_contains<F>(&mut self, needle: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn AircraftCapability> + Send + Sync + 'static,
    {
        let needle = needle.to_lowercase();
        self.register(move |path| path.to_lowercase().contains(&needle), factory)
    }

    /// Build the capability for `path`, falling back to [`NullCapability`].
    pub fn select(&self, path: &str) -> Arc<dyn AircraftCapability> {
        self.entries
            .iter()
            .find(|(matches, _)| matches(path))
            .map(|(_, factory)| factory())
            .unwrap_or_else(|| Arc::new(NullCapability))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
