//! Ground-service addon protocol.
//!
//! - [`state`] - service kinds, service states, snapshot decoding
//! - [`script`] - staged menu scripts per service
//! - [`bridge`] - the simulator variable bridge the scripts write through
//! - [`protocol`] - the state machine tying them together

mod bridge;
mod protocol;
mod script;
mod state;

pub use bridge::{
    BridgeWrite, RecordingBridge, SimBridge, TransportError, VAR_ADDON_RUNNING, VAR_MENU_CHOICE,
    VAR_MENU_OPEN,
};
pub use protocol::{ProtocolEvent, RequestError, ServiceProtocol};
pub use script::{MenuScript, MenuStep};
pub use state::{
    AddonSnapshot, DecodeError, PerService, PushbackProgress, ServiceKind, ServiceState,
    ADDON_FIELD_COUNT,
};
