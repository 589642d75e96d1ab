//! Service kinds, service states and the addon snapshot decoder.
//!
//! The ground-service addon publishes its state as a fixed-shape record of
//! nine numeric variables. [`AddonSnapshot::decode`] turns that record into
//! typed values; nothing here keeps history, that is the job of
//! [`ServiceProtocol`](super::ServiceProtocol).

use std::fmt;
use std::ops::{Index, IndexMut};

use tracing::warn;

/// Number of numeric fields in one addon snapshot.
pub const ADDON_FIELD_COUNT: usize = 9;

/// The five ground services the engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    Deboarding,
    Boarding,
    Refueling,
    Catering,
    Pushback,
}

impl ServiceKind {
    /// All service kinds in evaluation order.
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::Deboarding,
        ServiceKind::Boarding,
        ServiceKind::Refueling,
        ServiceKind::Catering,
        ServiceKind::Pushback,
    ];

    /// Stable index used by [`PerService`].
    pub const fn index(self) -> usize {
        match self {
            ServiceKind::Deboarding => 0,
            ServiceKind::Boarding => 1,
            ServiceKind::Refueling => 2,
            ServiceKind::Catering => 3,
            ServiceKind::Pushback => 4,
        }
    }

    /// 1-based entry of this service in the addon's main menu.
    ///
    /// Deboarding has no single entry; its script selects two options in a row.
    pub const fn menu_index(self) -> Option<u8> {
        match self {
            ServiceKind::Deboarding => None,
            ServiceKind::Catering => Some(2),
            ServiceKind::Refueling => Some(3),
            ServiceKind::Boarding => Some(4),
            ServiceKind::Pushback => Some(5),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Deboarding => "deboarding",
            ServiceKind::Boarding => "boarding",
            ServiceKind::Refueling => "refueling",
            ServiceKind::Catering => "catering",
            ServiceKind::Pushback => "pushback",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle state of one service as reported by the addon.
///
/// Discriminants match the numeric codes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceState {
    #[default]
    Unknown = 0,
    Callable = 1,
    NotAvailable = 2,
    Bypassed = 3,
    Requested = 4,
    Active = 5,
    Completed = 6,
}

impl ServiceState {
    /// Map a wire code to a state.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ServiceState::Unknown),
            1 => Some(ServiceState::Callable),
            2 => Some(ServiceState::NotAvailable),
            3 => Some(ServiceState::Bypassed),
            4 => Some(ServiceState::Requested),
            5 => Some(ServiceState::Active),
            6 => Some(ServiceState::Completed),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    /// Requested or Active: the addon is working on it.
    pub fn is_in_progress(self) -> bool {
        matches!(self, ServiceState::Requested | ServiceState::Active)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Unknown => "unknown",
            ServiceState::Callable => "callable",
            ServiceState::NotAvailable => "not available",
            ServiceState::Bypassed => "bypassed",
            ServiceState::Requested => "requested",
            ServiceState::Active => "active",
            ServiceState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// One value per [`ServiceKind`], indexable by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerService<T>([T; 5]);

impl<T> PerService<T> {
    pub fn from_fn(mut f: impl FnMut(ServiceKind) -> T) -> Self {
        Self(ServiceKind::ALL.map(&mut f))
    }

    /// Iterate `(kind, value)` pairs in [`ServiceKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceKind, &T)> {
        ServiceKind::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<ServiceKind> for PerService<T> {
    type Output = T;

    fn index(&self, kind: ServiceKind) -> &T {
        &self.0[kind.index()]
    }
}

impl<T> IndexMut<ServiceKind> for PerService<T> {
    fn index_mut(&mut self, kind: ServiceKind) -> &mut T {
        &mut self.0[kind.index()]
    }
}

/// Pushback progress counter published by the addon.
///
/// 0 is idle, 1 to 4 means a pushback is underway, 5 and above are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushbackProgress(pub i32);

impl PushbackProgress {
    pub fn is_underway(self) -> bool {
        self.0 > 0 && self.0 < 5
    }
}

/// Errors from decoding an addon snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} snapshot fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("snapshot field '{field}' is not a finite number")]
    NonFinite { field: &'static str },
}

/// Decoded addon snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AddonSnapshot {
    pub running: bool,
    pub menu_open: bool,
    pub menu_choice: i64,
    pub states: PerService<ServiceState>,
    pub pushback_progress: PushbackProgress,
}

const FIELD_NAMES: [&str; ADDON_FIELD_COUNT] = [
    "running",
    "menu_open",
    "menu_choice",
    "boarding_state",
    "deboarding_state",
    "departure_state",
    "pushback_status",
    "refueling_state",
    "catering_state",
];

impl AddonSnapshot {
    /// Decode the nine wire fields.
    ///
    /// Field order: running, menu open, menu choice, boarding, deboarding,
    /// departure (pushback), pushback progress, refueling, catering.
    ///
    /// An unrecognised state code decodes as [`ServiceState::Unknown`] for
    /// that service only; the rest of the record is kept.
    pub fn decode(fields: &[f64]) -> Result<Self, DecodeError> {
        if fields.len() != ADDON_FIELD_COUNT {
            return Err(DecodeError::FieldCount {
                expected: ADDON_FIELD_COUNT,
                actual: fields.len(),
            });
        }
        for (value, field) in fields.iter().zip(FIELD_NAMES) {
            if !value.is_finite() {
                return Err(DecodeError::NonFinite { field });
            }
        }

        let state = |kind: ServiceKind, raw: f64| {
            let code = raw.round() as i64;
            ServiceState::from_code(code).unwrap_or_else(|| {
                warn!(%kind, code, "Unknown service state code, treating as unknown");
                ServiceState::Unknown
            })
        };

        let mut states = PerService::default();
        states[ServiceKind::Boarding] = state(ServiceKind::Boarding, fields[3]);
        states[ServiceKind::Deboarding] = state(ServiceKind::Deboarding, fields[4]);
        states[ServiceKind::Pushback] = state(ServiceKind::Pushback, fields[5]);
        states[ServiceKind::Refueling] = state(ServiceKind::Refueling, fields[7]);
        states[ServiceKind::Catering] = state(ServiceKind::Catering, fields[8]);

        Ok(Self {
            running: fields[0] > 0.0,
            menu_open: fields[1] > 0.0,
            menu_choice: fields[2].round() as i64,
            states,
            pushback_progress: PushbackProgress(fields[6].round() as i32),
        })
    }
}
