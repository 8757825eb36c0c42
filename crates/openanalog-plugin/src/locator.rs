//! Device discovery.

use crate::config::DeviceSignature;
use crate::transport::{HidHandle, HidInterfaceInfo, HidPort};
use openanalog_common::{DeviceInfo, DeviceType, SdkResult};
use tracing::{debug, info, warn};

/// Locate the analog interface for `signature` and open it.
///
/// The keyboard exposes a variable number of logical HID interfaces, one
/// per usage; the one carrying analog data is by convention the one with
/// the highest interface index. The scan therefore runs in two passes:
/// find the maximum index among all matching entries, then open the entry
/// carrying that index.
///
/// `Ok(None)` means nothing usable was found (no matches, or the open
/// failed); the caller's state is left untouched. `Err` is reserved for
/// transport-level breakage.
pub fn locate(
    port: &mut dyn HidPort,
    signature: DeviceSignature,
) -> SdkResult<Option<(Box<dyn HidHandle>, DeviceInfo)>> {
    port.refresh()?;
    let interfaces = port.interfaces(signature.vendor_id, signature.product_id);
    if interfaces.is_empty() {
        debug!(
            "no HID interfaces match {:04x}:{:04x}",
            signature.vendor_id, signature.product_id
        );
        return Ok(None);
    }

    let Some(highest) = interfaces.iter().map(|i| i.interface_number).max() else {
        return Ok(None);
    };
    let Some(entry) = interfaces.iter().find(|i| i.interface_number == highest) else {
        return Ok(None);
    };

    match port.open(&entry.path) {
        Ok(handle) => {
            info!(
                "found and opened {} (interface {})",
                entry.product.as_deref().unwrap_or("<unnamed device>"),
                highest
            );
            Ok(Some((handle, descriptor_for(entry))))
        }
        Err(err) => {
            warn!("error opening analog interface {}: {}", entry.path, err);
            Ok(None)
        }
    }
}

fn descriptor_for(entry: &HidInterfaceInfo) -> DeviceInfo {
    DeviceInfo::new(
        entry.vendor_id,
        entry.product_id,
        entry.manufacturer.clone().unwrap_or_default(),
        entry.product.clone().unwrap_or_default(),
        // Interface index as a provisional device id: stable within one
        // connection session, not globally unique.
        entry.interface_number.max(0) as u64,
        DeviceType::Keyboard,
    )
}
