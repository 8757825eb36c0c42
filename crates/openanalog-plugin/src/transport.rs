//! HID transport abstraction.
//!
//! Mirrors the narrow slice of hidapi the plugin needs (enumerate,
//! open-by-path, non-blocking read) behind object-safe traits so the
//! locator and connection manager run unchanged against [`mock`].

use openanalog_common::{SdkError, SdkResult};
use std::ffi::CString;
use tracing::{debug, error, warn};

/// One enumerated HID interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HidInterfaceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Logical interface index within the parent device.
    pub interface_number: i32,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    /// Platform path used to open this interface.
    pub path: String,
}

/// Enumeration and open side of the transport.
pub trait HidPort: Send {
    /// Re-scan the bus so [`HidPort::interfaces`] reflects current state.
    fn refresh(&mut self) -> SdkResult<()>;

    /// Interfaces currently enumerated for the given vendor/product pair.
    fn interfaces(&self, vendor_id: u16, product_id: u16) -> Vec<HidInterfaceInfo>;

    /// Open an interface by platform path.
    fn open(&mut self, path: &str) -> SdkResult<Box<dyn HidHandle>>;
}

/// An open device handle.
pub trait HidHandle: Send {
    /// Non-blocking read of one input report into `buf`.
    ///
    /// `Ok(0)` means no report is pending; an error means the device has
    /// gone away.
    fn read_report(&mut self, buf: &mut [u8]) -> SdkResult<usize>;
}

/// Transport backed by the system hidapi library.
pub struct HidapiPort {
    api: hidapi::HidApi,
}

impl HidapiPort {
    /// Failure here means the OS HID layer itself is unusable.
    pub fn new() -> SdkResult<Self> {
        match hidapi::HidApi::new() {
            Ok(api) => Ok(Self { api }),
            Err(err) => {
                error!("failed to initialise hidapi: {err}");
                Err(SdkError::Failure)
            }
        }
    }
}

impl HidPort for HidapiPort {
    fn refresh(&mut self) -> SdkResult<()> {
        self.api.refresh_devices().map_err(|err| {
            warn!("HID device refresh failed: {err}");
            SdkError::Failure
        })
    }

    fn interfaces(&self, vendor_id: u16, product_id: u16) -> Vec<HidInterfaceInfo> {
        self.api
            .device_list()
            .filter(|device| device.vendor_id() == vendor_id && device.product_id() == product_id)
            .map(|device| HidInterfaceInfo {
                vendor_id: device.vendor_id(),
                product_id: device.product_id(),
                interface_number: device.interface_number(),
                manufacturer: device.manufacturer_string().map(str::to_owned),
                product: device.product_string().map(str::to_owned),
                path: device.path().to_string_lossy().into_owned(),
            })
            .collect()
    }

    fn open(&mut self, path: &str) -> SdkResult<Box<dyn HidHandle>> {
        let c_path = CString::new(path).map_err(|_| SdkError::InvalidArgument)?;
        match self.api.open_path(&c_path) {
            Ok(device) => Ok(Box::new(HidapiHandle { device })),
            Err(err) => {
                error!("error opening HID device {path}: {err}");
                Err(SdkError::Failure)
            }
        }
    }
}

struct HidapiHandle {
    device: hidapi::HidDevice,
}

impl HidHandle for HidapiHandle {
    fn read_report(&mut self, buf: &mut [u8]) -> SdkResult<usize> {
        self.device.read_timeout(buf, 0).map_err(|err| {
            debug!("HID read failed: {err}");
            SdkError::DeviceDisconnected
        })
    }
}

pub mod mock {
    //! Scriptable in-memory transport for tests.
    //!
    //! Clone one [`MockHidPort`] into the plugin and keep the other side
    //! in the test to script the bus: add or remove interfaces, queue
    //! reports, cut the connection.

    use super::{HidHandle, HidInterfaceInfo, HidPort};
    use openanalog_common::{SdkError, SdkResult};
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, MutexGuard};

    struct DeviceState {
        reads: VecDeque<Vec<u8>>,
        connected: bool,
        opens: usize,
        fail_open: bool,
    }

    impl Default for DeviceState {
        fn default() -> Self {
            Self {
                reads: VecDeque::new(),
                connected: true,
                opens: 0,
                fail_open: false,
            }
        }
    }

    #[derive(Default)]
    struct PortState {
        interfaces: Vec<HidInterfaceInfo>,
        devices: HashMap<String, Arc<Mutex<DeviceState>>>,
        refreshes: usize,
    }

    #[derive(Clone, Default)]
    pub struct MockHidPort {
        state: Arc<Mutex<PortState>>,
    }

    impl MockHidPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_interface(&self, info: HidInterfaceInfo) {
            let mut state = self.lock();
            state
                .devices
                .entry(info.path.clone())
                .or_insert_with(|| Arc::new(Mutex::new(DeviceState::default())));
            state.interfaces.push(info);
        }

        /// Simulate unplugging everything: enumeration goes empty, but
        /// already-open handles keep their scripted behavior.
        pub fn clear_interfaces(&self) {
            self.lock().interfaces.clear();
        }

        pub fn queue_read(&self, path: &str, report: impl Into<Vec<u8>>) {
            if let Some(device) = self.device(path) {
                lock_device(&device).reads.push_back(report.into());
            }
        }

        /// All subsequent reads on `path` fail until [`MockHidPort::reconnect`].
        pub fn disconnect(&self, path: &str) {
            if let Some(device) = self.device(path) {
                lock_device(&device).connected = false;
            }
        }

        pub fn reconnect(&self, path: &str) {
            if let Some(device) = self.device(path) {
                lock_device(&device).connected = true;
            }
        }

        pub fn set_open_fails(&self, path: &str, fail: bool) {
            if let Some(device) = self.device(path) {
                lock_device(&device).fail_open = fail;
            }
        }

        pub fn open_count(&self, path: &str) -> usize {
            self.device(path).map_or(0, |device| lock_device(&device).opens)
        }

        pub fn refresh_count(&self) -> usize {
            self.lock().refreshes
        }

        fn lock(&self) -> MutexGuard<'_, PortState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn device(&self, path: &str) -> Option<Arc<Mutex<DeviceState>>> {
            self.lock().devices.get(path).cloned()
        }
    }

    fn lock_device(device: &Arc<Mutex<DeviceState>>) -> MutexGuard<'_, DeviceState> {
        device.lock().unwrap_or_else(|e| e.into_inner())
    }

    impl HidPort for MockHidPort {
        fn refresh(&mut self) -> SdkResult<()> {
            self.lock().refreshes += 1;
            Ok(())
        }

        fn interfaces(&self, vendor_id: u16, product_id: u16) -> Vec<HidInterfaceInfo> {
            self.lock()
                .interfaces
                .iter()
                .filter(|i| i.vendor_id == vendor_id && i.product_id == product_id)
                .cloned()
                .collect()
        }

        fn open(&mut self, path: &str) -> SdkResult<Box<dyn HidHandle>> {
            let Some(device) = self.device(path) else {
                return Err(SdkError::Failure);
            };
            {
                let mut state = lock_device(&device);
                if state.fail_open {
                    return Err(SdkError::Failure);
                }
                state.opens += 1;
            }
            Ok(Box::new(MockHidHandle { device }))
        }
    }

    pub struct MockHidHandle {
        device: Arc<Mutex<DeviceState>>,
    }

    impl HidHandle for MockHidHandle {
        fn read_report(&mut self, buf: &mut [u8]) -> SdkResult<usize> {
            let mut state = lock_device(&self.device);
            if !state.connected {
                return Err(SdkError::DeviceDisconnected);
            }
            match state.reads.pop_front() {
                Some(report) => {
                    let len = report.len().min(buf.len());
                    buf[..len].copy_from_slice(&report[..len]);
                    Ok(len)
                }
                None => Ok(0),
            }
        }
    }
}
