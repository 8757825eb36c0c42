//! Connect/disconnect event surface.

use crate::DeviceInfo;
use serde::{Deserialize, Serialize};

/// Kind of lifecycle transition reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceEventType {
    Connected,
    Disconnected,
}

/// Listener a host registers to observe device lifecycle transitions.
///
/// The `device` reference is valid only for the duration of the call;
/// implementations must copy out any fields they want to retain. At most
/// one listener is registered with a plugin at a time.
pub trait DeviceEventListener: Send + Sync {
    fn on_device_event(&self, event: DeviceEventType, device: &DeviceInfo);
}

impl<F> DeviceEventListener for F
where
    F: Fn(DeviceEventType, &DeviceInfo) + Send + Sync,
{
    fn on_device_event(&self, event: DeviceEventType, device: &DeviceInfo) {
        self(event, device)
    }
}
