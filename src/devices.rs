//! The camera inventory: devices from config and id-based lookup.

use serde::Deserialize;
use tracing::warn;

/// One camera as declared in the config file. Loaded once at startup,
/// immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub location: String,
    pub info: String,
    /// RTSP URI of the camera stream.
    pub address: String,
}

/// In-memory id → device mapping built once from config.
///
/// Only the snapshot capability performs lookups; everything else sees the
/// device list through the CSV table in the system prompt.
pub struct DeviceDirectory {
    devices: Vec<Device>,
}

impl DeviceDirectory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// First device whose id matches. Ids are expected to be unique.
    pub fn lookup(&self, cam_id: &str) -> Option<&Device> {
        let device = self.devices.iter().find(|d| d.id == cam_id);
        if device.is_none() {
            warn!("no camera found with id {cam_id}");
        }
        device
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// CSV rows (`id,name,location,info`) for the system prompt, one device
/// per line, no header.
pub fn device_csv_body(devices: &[Device]) -> String {
    devices
        .iter()
        .map(|d| format!("{},{},{},{}", d.id, d.name, d.location, d.info))
        .collect::<Vec<_>>()
        .join("\n")
}
