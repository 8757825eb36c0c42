//! Connection lifecycle for the single managed device.

use crate::config::DeviceSignature;
use crate::locator;
use crate::transport::{HidHandle, HidPort};
use analog_keyboard_report::analog_report::REPORT_LEN;
use openanalog_common::{DeviceEventType, DeviceId, DeviceInfo, SdkError, SdkResult};
use tracing::warn;

/// Lifecycle of the managed device.
///
/// `Uninitialized -> Connected -> Disconnected -> Connected -> …`; only
/// an explicit unload returns to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Uninitialized,
    Connected,
    Disconnected,
}

/// Lifecycle transition to be delivered to the registered listener.
///
/// Transitions are surfaced as values rather than invoked inline so the
/// facade can fire the listener after its locks are released.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    pub event: DeviceEventType,
    pub device: DeviceInfo,
}

/// Owns the transport, the single device handle, and the raw report
/// buffer. At most one handle is held at a time.
pub struct ConnectionManager {
    port: Box<dyn HidPort>,
    signature: DeviceSignature,
    handle: Option<Box<dyn HidHandle>>,
    state: ConnectionState,
    /// Last-known descriptor. Survives disconnection so device filters
    /// keep matching while reconnection is attempted; cleared on unload.
    descriptor: Option<DeviceInfo>,
    /// Most recent raw report. A zero-length (no data) read leaves the
    /// previous report in place.
    report: [u8; REPORT_LEN],
    pending: Vec<PendingEvent>,
}

impl ConnectionManager {
    pub fn new(port: Box<dyn HidPort>, signature: DeviceSignature) -> Self {
        Self {
            port,
            signature,
            handle: None,
            state: ConnectionState::Uninitialized,
            descriptor: None,
            report: [0; REPORT_LEN],
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn descriptor(&self) -> Option<&DeviceInfo> {
        self.descriptor.as_ref()
    }

    pub fn report(&self) -> &[u8; REPORT_LEN] {
        &self.report
    }

    /// Lifecycle transitions accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<PendingEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Device filter semantics: 0 matches anything, otherwise the filter
    /// must equal the last-known device id.
    pub fn matches_filter(&self, device_id: DeviceId) -> bool {
        if device_id == 0 {
            return true;
        }
        self.descriptor
            .as_ref()
            .is_some_and(|d| d.device_id == device_id)
    }

    /// Idempotent: trivially Ok when already connected, otherwise locates
    /// once. `NoDevices` when no device is connected on return.
    pub fn initialise(&mut self) -> SdkResult<()> {
        if self.is_connected() {
            return Ok(());
        }
        if self.connect()? {
            Ok(())
        } else {
            Err(SdkError::NoDevices)
        }
    }

    /// Called before every read. A failed locate surfaces as
    /// `DeviceDisconnected` on the read path.
    pub fn ensure_connected(&mut self) -> SdkResult<()> {
        if self.is_connected() {
            return Ok(());
        }
        match self.connect() {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(SdkError::DeviceDisconnected),
        }
    }

    fn connect(&mut self) -> SdkResult<bool> {
        match locator::locate(self.port.as_mut(), self.signature)? {
            Some((handle, descriptor)) => {
                self.handle = Some(handle);
                self.state = ConnectionState::Connected;
                self.descriptor = Some(descriptor.clone());
                self.pending.push(PendingEvent {
                    event: DeviceEventType::Connected,
                    device: descriptor,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Non-blocking read of one report into the internal buffer.
    ///
    /// An error from the transport marks the device disconnected and
    /// queues the Disconnected event exactly once per connection session.
    pub fn refresh_report(&mut self) -> SdkResult<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(SdkError::DeviceDisconnected);
        };
        let mut buf = [0u8; REPORT_LEN];
        match handle.read_report(&mut buf) {
            Ok(0) => Ok(()),
            Ok(len) => {
                let len = len.min(REPORT_LEN);
                self.report[..len].copy_from_slice(&buf[..len]);
                Ok(())
            }
            Err(_) => {
                self.mark_disconnected();
                Err(SdkError::DeviceDisconnected)
            }
        }
    }

    fn mark_disconnected(&mut self) {
        warn!("analog device disconnected");
        self.handle = None;
        self.state = ConnectionState::Disconnected;
        if let Some(descriptor) = self.descriptor.clone() {
            self.pending.push(PendingEvent {
                event: DeviceEventType::Disconnected,
                device: descriptor,
            });
        }
    }

    /// Release the handle and forget the device entirely.
    pub fn unload(&mut self) {
        self.handle = None;
        self.descriptor = None;
        self.report = [0; REPORT_LEN];
        self.state = ConnectionState::Uninitialized;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WOOTING_ONE;
    use crate::transport::HidInterfaceInfo;
    use crate::transport::mock::MockHidPort;

    fn interface(path: &str, number: i32) -> HidInterfaceInfo {
        HidInterfaceInfo {
            vendor_id: WOOTING_ONE.vendor_id,
            product_id: WOOTING_ONE.product_id,
            interface_number: number,
            manufacturer: Some("Wooting".to_owned()),
            product: Some("Wooting One".to_owned()),
            path: path.to_owned(),
        }
    }

    fn manager_with_device() -> (ConnectionManager, MockHidPort) {
        let port = MockHidPort::new();
        port.add_interface(interface("path2", 2));
        let manager = ConnectionManager::new(Box::new(port.clone()), WOOTING_ONE);
        (manager, port)
    }

    #[test]
    fn initialise_connects_and_emits_connected() {
        let (mut manager, _port) = manager_with_device();

        assert_eq!(manager.state(), ConnectionState::Uninitialized);
        manager.initialise().expect("device present");
        assert_eq!(manager.state(), ConnectionState::Connected);

        let events = manager.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, DeviceEventType::Connected);
        assert_eq!(events[0].device.device_id, 2);
    }

    #[test]
    fn initialise_is_idempotent() {
        let (mut manager, port) = manager_with_device();

        manager.initialise().expect("device present");
        manager.initialise().expect("still connected");
        assert_eq!(port.open_count("path2"), 1);
        assert_eq!(manager.take_events().len(), 1);
    }

    #[test]
    fn initialise_without_device_is_no_devices() {
        let port = MockHidPort::new();
        let mut manager = ConnectionManager::new(Box::new(port), WOOTING_ONE);

        assert_eq!(manager.initialise(), Err(SdkError::NoDevices));
        assert_eq!(manager.state(), ConnectionState::Uninitialized);
        assert!(manager.take_events().is_empty());
    }

    #[test]
    fn read_error_transitions_to_disconnected_once() {
        let (mut manager, port) = manager_with_device();
        manager.initialise().expect("device present");
        let _ = manager.take_events();

        port.disconnect("path2");
        assert_eq!(manager.refresh_report(), Err(SdkError::DeviceDisconnected));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(!manager.is_connected());

        let events = manager.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, DeviceEventType::Disconnected);

        // Descriptor survives for filter matching.
        assert!(manager.matches_filter(2));
        assert!(manager.descriptor().is_some());
    }

    #[test]
    fn ensure_connected_reconnects_after_disconnect() {
        let (mut manager, port) = manager_with_device();
        manager.initialise().expect("device present");
        port.disconnect("path2");
        let _ = manager.refresh_report();
        let _ = manager.take_events();

        port.reconnect("path2");
        manager.ensure_connected().expect("device re-enumerable");
        assert_eq!(manager.state(), ConnectionState::Connected);

        let events = manager.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, DeviceEventType::Connected);
    }

    #[test]
    fn ensure_connected_fails_as_disconnected_when_gone() {
        let (mut manager, port) = manager_with_device();
        manager.initialise().expect("device present");
        port.disconnect("path2");
        let _ = manager.refresh_report();
        port.clear_interfaces();

        assert_eq!(manager.ensure_connected(), Err(SdkError::DeviceDisconnected));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn zero_length_read_keeps_previous_report() {
        let (mut manager, port) = manager_with_device();
        manager.initialise().expect("device present");

        port.queue_read("path2", vec![0x00, 0x04, 0x32]);
        manager.refresh_report().expect("read queued report");
        assert_eq!(&manager.report()[..3], &[0x00, 0x04, 0x32]);

        // Queue is now empty: read reports no data, buffer is untouched.
        manager.refresh_report().expect("empty read is not an error");
        assert_eq!(&manager.report()[..3], &[0x00, 0x04, 0x32]);
    }

    #[test]
    fn filter_zero_matches_anything() {
        let (mut manager, _port) = manager_with_device();
        assert!(manager.matches_filter(0));
        assert!(!manager.matches_filter(7));

        manager.initialise().expect("device present");
        assert!(manager.matches_filter(0));
        assert!(manager.matches_filter(2));
        assert!(!manager.matches_filter(7));
    }

    #[test]
    fn unload_resets_to_uninitialized() {
        let (mut manager, _port) = manager_with_device();
        manager.initialise().expect("device present");

        manager.unload();
        assert_eq!(manager.state(), ConnectionState::Uninitialized);
        assert!(manager.descriptor().is_none());
        assert!(manager.take_events().is_empty());
        assert_eq!(manager.report(), &[0u8; REPORT_LEN]);
    }
}
