//! OpenAnalog reference plugin for analog keyboards.
//!
//! Wires the device locator, connection manager, and report decoder into
//! the facade an SDK host drives: `initialise`, the two read entry
//! points, `device_info`, listener registration, and `unload`. The HID
//! transport is abstracted behind [`transport::HidPort`] so everything
//! above the raw hidapi calls can be exercised against
//! [`transport::mock`].

pub mod config;
pub mod connection;
pub mod locator;
pub mod plugin;
pub mod transport;

pub use config::{DeviceSignature, PluginConfig, WOOTING_ONE};
pub use connection::{ConnectionManager, ConnectionState, PendingEvent};
pub use plugin::{AnalogPlugin, PLUGIN_NAME};
pub use transport::{HidHandle, HidInterfaceInfo, HidPort, HidapiPort};

// Re-exported so hosts don't need direct dependencies on the type crates
// when consuming the plugin's return values.
pub use analog_keyboard_report::{AnalogSample, analog_report, scale_bulk, scale_single_key};
pub use openanalog_common::{
    DeviceEventListener, DeviceEventType, DeviceId, DeviceInfo, DeviceType, SdkError, SdkResult,
};
