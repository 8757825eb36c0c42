//! Plugin configuration.

use serde::{Deserialize, Serialize};

/// Vendor/product pair identifying the supported keyboard on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceSignature {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceSignature {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

/// First-generation Wooting analog keyboard.
pub const WOOTING_ONE: DeviceSignature = DeviceSignature::new(0x03EB, 0xFF01);

/// Host-facing configuration.
///
/// Defaults target the first-generation keyboard; hosts that ship
/// alternate hardware revisions override the signature from their own
/// configuration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub signature: DeviceSignature,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            signature: WOOTING_ONE,
        }
    }
}
