//! In-memory `DeviceApi` for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::BmcError;
use crate::unifi::{Device, DeviceApi, PortOverride};

#[derive(Default)]
pub(crate) struct FakeDeviceApi {
    devices: Mutex<Vec<Device>>,
    lookups: AtomicUsize,
    updates: AtomicUsize,
    fail_updates: bool,
}

impl FakeDeviceApi {
    pub(crate) fn with_device(device: Device) -> Self {
        Self {
            devices: Mutex::new(vec![device]),
            ..Default::default()
        }
    }

    /// A controller whose writes always fail.
    pub(crate) fn failing_updates(device: Device) -> Self {
        Self {
            fail_updates: true,
            ..Self::with_device(device)
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub(crate) fn device(&self, mac: &str) -> Option<Device> {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.mac == mac)
            .cloned()
    }
}

/// Switch `aa:bb:cc:dd:ee:ff` with the given `(port_idx, poe_mode)` overrides.
pub(crate) fn switch(ports: &[(u32, &str)]) -> Device {
    let mut extra = serde_json::Map::new();
    extra.insert("name".to_string(), "rack-switch".into());
    Device {
        id: "dev1".to_string(),
        mac: "aa:bb:cc:dd:ee:ff".to_string(),
        port_overrides: ports
            .iter()
            .map(|(idx, mode)| PortOverride {
                port_idx: *idx,
                poe_mode: Some(mode.to_string()),
                extra: serde_json::Map::new(),
            })
            .collect(),
        extra,
    }
}

#[async_trait]
impl DeviceApi for FakeDeviceApi {
    async fn get_device_by_mac(&self, mac: &str) -> crate::Result<Device> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.device(mac)
            .ok_or_else(|| BmcError::DeviceNotFound(mac.to_string()))
    }

    async fn update_device(&self, device: &Device) -> crate::Result<Device> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates {
            return Err(BmcError::Api("api.err.NoPermission".to_string()));
        }
        let mut devices = self.devices.lock().unwrap();
        match devices.iter_mut().find(|d| d.id == device.id) {
            Some(stored) => {
                *stored = device.clone();
                Ok(device.clone())
            }
            None => Err(BmcError::Api(format!("api.err.IdInvalid: {}", device.id))),
        }
    }
}
