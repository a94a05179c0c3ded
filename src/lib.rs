//! BMC RPC — power control for bare-metal machines fed by switch PoE ports.
//! Accepts BMC-style RPC calls over HTTP, maps each logical host to a switch
//! MAC address and port index, and reads or writes that port's PoE mode through
//! a UniFi controller.

pub mod config;
pub mod error;
pub mod mac;
pub mod power;
pub mod rpc;
pub mod server;
pub mod unifi;

pub use config::{BmcConfig, Machine, parse_env_ref, resolve_secret};
pub use error::{BmcError, Result};
pub use mac::normalize_mac;
pub use power::{PortController, PowerChange, PowerState};
pub use rpc::{
    BootDeviceParams, Call, PowerSetParams, RequestPayload, ResponseError, ResponsePayload,
};
pub use server::{AppState, router};
pub use unifi::{Device, DeviceApi, PortOverride, UnifiClient};
