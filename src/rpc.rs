//! RPC envelopes and method decoding.
//!
//! Requests look like `{"id": 1, "host": "node1", "method": "power.set",
//! "params": {"state": "on"}}`. The shape of `params` depends on `method`, so
//! the pair is decoded together into a [`Call`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BmcError;

pub const POWER_GET_METHOD: &str = "power.get";
pub const POWER_SET_METHOD: &str = "power.set";
pub const BOOT_DEVICE_METHOD: &str = "boot.device";
pub const PING_METHOD: &str = "ping";

/// Inbound RPC envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestPayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Outbound RPC envelope. `error` is only present on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePayload {
    pub id: i64,
    pub host: String,
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseError {
    pub code: u16,
    pub message: String,
}

impl ResponsePayload {
    pub fn success(id: i64, host: impl Into<String>, result: Value) -> Self {
        Self {
            id,
            host: host.into(),
            result,
            error: None,
        }
    }

    pub fn failure(id: i64, host: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self {
            id,
            host: host.into(),
            result: Value::Null,
            error: Some(ResponseError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Params for `power.set`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PowerSetParams {
    /// `"on"` or `"off"`; anything else is accepted and ignored.
    pub state: String,
}

/// Params for `boot.device`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootDeviceParams {
    pub device: String,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub efi_boot: bool,
}

/// A decoded RPC call, one variant per method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PowerGet,
    PowerSet(PowerSetParams),
    BootDevice(BootDeviceParams),
    Ping,
}

impl Call {
    /// Decode `params` according to `method`.
    pub fn from_request(method: &str, params: Value) -> crate::Result<Self> {
        match method {
            POWER_GET_METHOD => Ok(Call::PowerGet),
            POWER_SET_METHOD => decode_params(method, params).map(Call::PowerSet),
            BOOT_DEVICE_METHOD => decode_params(method, params).map(Call::BootDevice),
            PING_METHOD => Ok(Call::Ping),
            other => Err(BmcError::UnknownMethod(other.to_string())),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Call::PowerGet => POWER_GET_METHOD,
            Call::PowerSet(_) => POWER_SET_METHOD,
            Call::BootDevice(_) => BOOT_DEVICE_METHOD,
            Call::Ping => PING_METHOD,
        }
    }

    /// Whether the call acts on a configured machine.
    pub fn needs_machine(&self) -> bool {
        !matches!(self, Call::Ping)
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(method: &str, params: Value) -> crate::Result<T> {
    serde_json::from_value(params).map_err(|e| BmcError::InvalidParams(method.to_string(), e.to_string()))
}
