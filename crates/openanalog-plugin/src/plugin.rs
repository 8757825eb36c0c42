//! The plugin facade.
//!
//! Owns one [`ConnectionManager`] and the single listener slot. Hosts may
//! call from multiple threads: the connection state is behind a mutex
//! held only across the I/O call and the decode step, and the listener is
//! invoked after every lock is released, so a listener that re-enters the
//! plugin cannot deadlock.

use crate::config::PluginConfig;
use crate::connection::{ConnectionManager, PendingEvent};
use crate::transport::{HidPort, HidapiPort};
use analog_keyboard_report::{AnalogSample, decode_report, lookup_key, scale_single_key};
use openanalog_common::{DeviceEventListener, DeviceId, DeviceInfo, SdkError, SdkResult};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Display name reported to the SDK host.
pub const PLUGIN_NAME: &str = "OpenAnalog Keyboard Plugin";

/// One plugin instance. Hosts own as many independent instances as they
/// like; there is no process-wide state.
pub struct AnalogPlugin {
    state: Mutex<PluginState>,
    listener: Mutex<Option<Arc<dyn DeviceEventListener>>>,
}

struct PluginState {
    connection: ConnectionManager,
    initialised: bool,
}

impl AnalogPlugin {
    /// Plugin backed by the system hidapi transport.
    pub fn new(config: PluginConfig) -> SdkResult<Self> {
        Ok(Self::with_port(Box::new(HidapiPort::new()?), config))
    }

    /// Plugin backed by a caller-supplied transport (tests, alternative
    /// HID backends).
    pub fn with_port(port: Box<dyn HidPort>, config: PluginConfig) -> Self {
        Self {
            state: Mutex::new(PluginState {
                connection: ConnectionManager::new(port, config.signature),
                initialised: false,
            }),
            listener: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Locate and open the device. Idempotent; Ok iff a device is
    /// connected on return.
    pub fn initialise(&self) -> SdkResult<()> {
        let (result, events) = {
            let mut state = self.state.lock();
            let result = state.connection.initialise();
            if result.is_ok() {
                state.initialised = true;
            }
            (result, state.connection.take_events())
        };
        self.dispatch(events);
        if result.is_ok() {
            info!("{PLUGIN_NAME} initialised");
        }
        result
    }

    pub fn is_initialised(&self) -> bool {
        self.state.lock().initialised
    }

    /// Read one report and decode every active key with the bulk scaling
    /// policy. At most `max_entries` samples are returned.
    pub fn read_full_buffer(
        &self,
        max_entries: usize,
        device_filter: DeviceId,
    ) -> SdkResult<Vec<AnalogSample>> {
        let (result, events) = {
            let mut state = self.state.lock();
            let result = Self::refresh_locked(&mut state, device_filter)
                .map(|()| decode_report(state.connection.report(), max_entries));
            (result, state.connection.take_events())
        };
        self.dispatch(events);
        result
    }

    /// Read one report and return the intensity of `code` under the
    /// single-key scaling policy. An absent key reads as 0.0; that is a
    /// normal outcome, not an error.
    pub fn read_analog(&self, code: u16, device_filter: DeviceId) -> SdkResult<f32> {
        let (result, events) = {
            let mut state = self.state.lock();
            let result = Self::refresh_locked(&mut state, device_filter).map(|()| {
                lookup_key(state.connection.report(), code)
                    .map(scale_single_key)
                    .unwrap_or(0.0)
            });
            (result, state.connection.take_events())
        };
        self.dispatch(events);
        result
    }

    /// Descriptors of the managed devices: at most one, since this
    /// plugin drives a single physical keyboard. `max_devices` must leave
    /// room for at least one entry.
    pub fn device_info(&self, max_devices: usize) -> SdkResult<Vec<DeviceInfo>> {
        let state = self.state.lock();
        if !state.initialised {
            return Err(SdkError::UnInitialized);
        }
        if max_devices == 0 {
            return Err(SdkError::InvalidArgument);
        }
        Ok(state.connection.descriptor().cloned().into_iter().collect())
    }

    /// Register `listener`, replacing any previous registration.
    pub fn set_device_event_cb(
        &self,
        listener: impl DeviceEventListener + 'static,
    ) -> SdkResult<()> {
        if !self.is_initialised() {
            return Err(SdkError::UnInitialized);
        }
        *self.listener.lock() = Some(Arc::new(listener));
        Ok(())
    }

    /// Remove the registered listener; a no-op when none is registered.
    pub fn clear_device_event_cb(&self) -> SdkResult<()> {
        if !self.is_initialised() {
            return Err(SdkError::UnInitialized);
        }
        *self.listener.lock() = None;
        Ok(())
    }

    /// Release the device and the listener and return to the
    /// uninitialised state. Never fails.
    pub fn unload(&self) {
        {
            let mut state = self.state.lock();
            state.connection.unload();
            state.initialised = false;
        }
        *self.listener.lock() = None;
        info!("{PLUGIN_NAME} unloaded");
    }

    /// Precondition chain shared by both read entry points: initialised,
    /// then the device filter, then connection and a fresh report.
    fn refresh_locked(state: &mut PluginState, device_filter: DeviceId) -> SdkResult<()> {
        if !state.initialised {
            return Err(SdkError::UnInitialized);
        }
        if !state.connection.matches_filter(device_filter) {
            return Err(SdkError::NoDevices);
        }
        state.connection.ensure_connected()?;
        state.connection.refresh_report()
    }

    /// Deliver pending lifecycle events. The listener is cloned out under
    /// its own lock and invoked with no locks held.
    fn dispatch(&self, events: Vec<PendingEvent>) {
        if events.is_empty() {
            return;
        }
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            for pending in events {
                listener.on_device_event(pending.event, &pending.device);
            }
        }
    }
}
