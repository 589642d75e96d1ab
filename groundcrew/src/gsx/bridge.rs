//! Simulator variable bridge.
//!
//! The engine controls the addon through two scalar variables and may ask the
//! transport to watch one extra per-aircraft variable. The transport itself
//! (SDK connection, data definitions, message pump) lives outside this crate
//! and implements [`SimBridge`].

use std::sync::Mutex;

use tokio::time::Instant;

/// Addon running flag.
pub const VAR_ADDON_RUNNING: &str = "L:FSDT_GSX_COUATL_STARTED";
/// Menu open flag (write 1 to open, 0 to close).
pub const VAR_MENU_OPEN: &str = "L:FSDT_GSX_MENU_OPEN";
/// Menu choice, 0-based.
pub const VAR_MENU_CHOICE: &str = "L:FSDT_GSX_MENU_CHOICE";

/// Errors raised by the simulator transport.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("write of {value} to {variable} failed: {reason}")]
    WriteFailed {
        variable: String,
        value: f64,
        reason: String,
    },

    #[error("failed to watch {variable}: {reason}")]
    WatchFailed { variable: String, reason: String },

    #[error("simulator bridge is closed")]
    Closed,
}

/// Write access to simulator variables.
pub trait SimBridge: Send + Sync + 'static {
    /// Write a scalar simulator variable.
    fn write_variable(&self, name: &str, value: f64) -> Result<(), TransportError>;

    /// Start delivering updates for `name` as activation-variable inputs.
    fn watch_variable(&self, name: &str) -> Result<(), TransportError>;
}

/// A variable write captured by [`RecordingBridge`].
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeWrite {
    pub variable: String,
    pub value: f64,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct RecorderInner {
    writes: Vec<BridgeWrite>,
    watched: Vec<String>,
    fail_after: Option<usize>,
}

/// Bridge that records writes instead of sending them.
///
/// Used for dry runs and replays, where every menu write is logged and kept
/// for inspection.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    inner: Mutex<RecorderInner>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write once `count` writes have succeeded.
    pub fn fail_writes_after(&self, count: usize) {
        self.inner.lock().unwrap().fail_after = Some(count);
    }

    pub fn writes(&self) -> Vec<BridgeWrite> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Recorded writes as `(variable, value)` pairs.
    pub fn write_values(&self) -> Vec<(String, f64)> {
        self.inner
            .lock()
            .unwrap()
            .writes
            .iter()
            .map(|w| (w.variable.clone(), w.value))
            .collect()
    }

    pub fn watched(&self) -> Vec<String> {
        self.inner.lock().unwrap().watched.clone()
    }
}

impl SimBridge for RecordingBridge {
    fn write_variable(&self, name: &str, value: f64) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_after.is_some_and(|limit| inner.writes.len() >= limit) {
            return Err(TransportError::WriteFailed {
                variable: name.to_string(),
                value,
                reason: "injected failure".to_string(),
            });
        }
        tracing::debug!(variable = name, value, "Simulator variable write");
        inner.writes.push(BridgeWrite {
            variable: name.to_string(),
            value,
            at: Instant::now(),
        });
        Ok(())
    }

    fn watch_variable(&self, name: &str) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.watched.iter().any(|w| w == name) {
            inner.watched.push(name.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_writes_in_order() {
        let bridge = RecordingBridge::new();
        bridge.write_variable(VAR_MENU_OPEN, 1.0).unwrap();
        bridge.write_variable(VAR_MENU_CHOICE, 3.0).unwrap();

        assert_eq!(
            bridge.write_values(),
            vec![
                (VAR_MENU_OPEN.to_string(), 1.0),
                (VAR_MENU_CHOICE.to_string(), 3.0)
            ]
        );
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let bridge = RecordingBridge::new();
        bridge.fail_writes_after(1);

        assert!(bridge.write_variable(VAR_MENU_OPEN, 0.0).is_ok());
        let err = bridge.write_variable(VAR_MENU_OPEN, 1.0).unwrap_err();
        assert!(matches!(err, TransportError::WriteFailed { .. }));
        assert_eq!(bridge.writes().len(), 1);
    }

    #[test]
    fn test_watch_is_deduplicated() {
        let bridge = RecordingBridge::new();
        bridge.watch_variable("L:SWITCH").unwrap();
        bridge.watch_variable("L:SWITCH").unwrap();
        assert_eq!(bridge.watched(), vec!["L:SWITCH".to_string()]);
    }
}
