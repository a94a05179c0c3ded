//! Port state translation: machine power ↔ switch PoE mode.
//!
//! A machine is "on" when the switch port feeding it has PoE mode `auto` and
//! "off" when the mode is `off`. Any other mode has no power-state meaning and
//! is reported as unknown rather than guessed.

use std::fmt;
use std::sync::Arc;

use crate::error::BmcError;
use crate::mac::normalize_mac;
use crate::unifi::{DeviceApi, PortOverride};

const POE_AUTO: &str = "auto";
const POE_OFF: &str = "off";

/// Binary machine power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Parse the RPC vocabulary (`"on"` / `"off"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "on" => Some(PowerState::On),
            "off" => Some(PowerState::Off),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Off => "off",
        }
    }

    /// The PoE mode that produces this state.
    pub fn poe_mode(self) -> &'static str {
        match self {
            PowerState::On => POE_AUTO,
            PowerState::Off => POE_OFF,
        }
    }

    /// Map a PoE mode back to a power state. `None` for unmapped modes.
    pub fn from_poe_mode(mode: &str) -> Option<Self> {
        match mode {
            POE_AUTO => Some(PowerState::On),
            POE_OFF => Some(PowerState::Off),
            _ => None,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Power state of a port override, if its mode maps to one.
pub fn port_power(port: &PortOverride) -> Option<PowerState> {
    port.poe_mode.as_deref().and_then(PowerState::from_poe_mode)
}

/// Outcome of a set-power request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerChange {
    /// Port was already in the requested state; nothing was written.
    Unchanged,
    /// Port mode was changed and the device record was written back.
    Updated,
}

/// Parse a port index given as text (config or URL segment).
pub fn parse_port_idx(port_idx: &str) -> crate::Result<u32> {
    port_idx
        .parse::<u32>()
        .map_err(|e| BmcError::InvalidPortIndex(port_idx.to_string(), e))
}

/// Reads and writes machine power through switch port overrides.
#[derive(Clone)]
pub struct PortController {
    api: Arc<dyn DeviceApi>,
}

impl PortController {
    pub fn new(api: Arc<dyn DeviceApi>) -> Self {
        Self { api }
    }

    /// Find the port override for `port_idx` on the switch with `mac`.
    ///
    /// The first override with a matching index wins. A device without one is
    /// `PortNotFound`, never a default port.
    pub async fn lookup_port(&self, mac: &str, port_idx: &str) -> crate::Result<PortOverride> {
        let idx = parse_port_idx(port_idx)?;
        let mac = normalize_mac(mac)?;

        let device = self.api.get_device_by_mac(&mac).await?;
        device
            .port(idx)
            .cloned()
            .ok_or(BmcError::PortNotFound(mac, idx))
    }

    /// Current power state of a machine. `None` when the port mode is neither
    /// `auto` nor `off`.
    pub async fn get_power(&self, mac: &str, port_idx: &str) -> crate::Result<Option<PowerState>> {
        let port = self.lookup_port(mac, port_idx).await?;
        let state = port_power(&port);
        if state.is_none() {
            tracing::warn!(
                mac = %mac,
                port_idx = %port_idx,
                poe_mode = ?port.poe_mode,
                "PoE mode does not map to a power state"
            );
        }
        Ok(state)
    }

    /// Drive a machine to `desired`.
    ///
    /// Writes nothing when the port is already in that state. Otherwise the
    /// whole device record is sent back with the one port changed; the
    /// controller applies it last-writer-wins.
    pub async fn set_power(
        &self,
        mac: &str,
        port_idx: &str,
        desired: PowerState,
    ) -> crate::Result<PowerChange> {
        let idx = parse_port_idx(port_idx)?;
        let mac = normalize_mac(mac)?;

        let mut device = self.api.get_device_by_mac(&mac).await?;
        let port = device
            .port_mut(idx)
            .ok_or_else(|| BmcError::PortNotFound(mac.clone(), idx))?;

        let target = desired.poe_mode();
        if port.poe_mode.as_deref() == Some(target) {
            tracing::debug!(mac = %mac, port_idx = idx, state = %desired, "port already in requested state");
            return Ok(PowerChange::Unchanged);
        }

        let previous = port.poe_mode.replace(target.to_string());
        self.api.update_device(&device).await?;

        tracing::info!(
            mac = %mac,
            port_idx = idx,
            from = ?previous,
            to = target,
            "PoE mode updated"
        );
        Ok(PowerChange::Updated)
    }
}
