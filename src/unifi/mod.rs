//! Upstream network controller access.
//!
//! `DeviceApi` is the seam the port translator talks through; `UnifiClient` is
//! the production implementation against a UniFi controller's REST API.

pub mod client;
pub mod device;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

pub use client::UnifiClient;
pub use device::{Device, PortOverride};

/// Device lookup and update against the controller.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Fetch the device with this MAC address (lowercase, colon-separated).
    async fn get_device_by_mac(&self, mac: &str) -> crate::Result<Device>;

    /// Persist the full device record, returning what the controller stored.
    async fn update_device(&self, device: &Device) -> crate::Result<Device>;
}
