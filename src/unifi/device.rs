//! Controller device records.
//!
//! Only the fields this service reads or writes are typed. Everything else the
//! controller returns is kept in `extra` so a full-record update sends the
//! device back unchanged apart from the edited port override.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A managed switch as the controller reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub port_overrides: Vec<PortOverride>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-port configuration on a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortOverride {
    pub port_idx: u32,
    /// `"auto"` supplies power, `"off"` does not. Other modes exist
    /// (e.g. `"pasv24"`, `"passthrough"`) and are left alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe_mode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    /// First port override with the given index.
    pub fn port(&self, port_idx: u32) -> Option<&PortOverride> {
        self.port_overrides.iter().find(|p| p.port_idx == port_idx)
    }

    /// Mutable access to the first port override with the given index.
    pub fn port_mut(&mut self, port_idx: u32) -> Option<&mut PortOverride> {
        self.port_overrides.iter_mut().find(|p| p.port_idx == port_idx)
    }
}

/// Response envelope for every controller API call.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub meta: ApiMeta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMeta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}
