//! Device identity exposed to SDK hosts.

use serde::{Deserialize, Serialize};

/// Identifier for a connected device, stable for the lifetime of one
/// connection session.
pub type DeviceId = u64;

/// Hardware category of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Keyboard,
    Keypad,
    Other,
}

/// Descriptor for a connected analog device. Immutable once populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer_name: String,
    pub device_name: String,
    /// Currently derived from the HID interface index of the analog
    /// interface: stable within a session, not unique across multiple
    /// identical devices on one bus.
    pub device_id: DeviceId,
    pub device_type: DeviceType,
}

impl DeviceInfo {
    pub fn new(
        vendor_id: u16,
        product_id: u16,
        manufacturer_name: impl Into<String>,
        device_name: impl Into<String>,
        device_id: DeviceId,
        device_type: DeviceType,
    ) -> Self {
        Self {
            vendor_id,
            product_id,
            manufacturer_name: manufacturer_name.into(),
            device_name: device_name.into(),
            device_id,
            device_type,
        }
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    pub fn display_name(&self) -> String {
        if !self.device_name.is_empty() {
            self.device_name.clone()
        } else if !self.manufacturer_name.is_empty() {
            self.manufacturer_name.clone()
        } else {
            format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard() -> DeviceInfo {
        DeviceInfo::new(0x03EB, 0xFF01, "Wooting", "Wooting One", 2, DeviceType::Keyboard)
    }

    #[test]
    fn test_device_info_creation() {
        let info = keyboard();
        assert_eq!(info.vendor_id, 0x03EB);
        assert_eq!(info.product_id, 0xFF01);
        assert_eq!(info.device_id, 2);
        assert!(info.matches(0x03EB, 0xFF01));
        assert!(!info.matches(0x03EB, 0xFF02));
    }

    #[test]
    fn test_device_info_display_name() {
        assert_eq!(keyboard().display_name(), "Wooting One");

        let info = DeviceInfo::new(0x03EB, 0xFF01, "Wooting", "", 2, DeviceType::Keyboard);
        assert_eq!(info.display_name(), "Wooting");

        let info = DeviceInfo::new(0x03EB, 0xFF01, "", "", 2, DeviceType::Keyboard);
        assert_eq!(info.display_name(), "03eb:ff01");
    }

    #[test]
    fn test_device_info_serde_round_trip() {
        let info = keyboard();
        let json = serde_json::to_string(&info).expect("serialize device info");
        let back: DeviceInfo = serde_json::from_str(&json).expect("deserialize device info");
        assert_eq!(info, back);
    }
}
