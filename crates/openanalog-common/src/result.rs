//! Status codes crossing the plugin ABI boundary.

use thiserror::Error;

/// Closed set of failure codes a plugin operation can return.
///
/// Success is the `Ok` arm of [`SdkResult`]; every failure travels as a
/// value, never as a panic. The set is fixed for compatibility: loaders
/// and wrappers match on it exhaustively, so new codes must not be added
/// without an ABI revision. Some variants (`NoPlugins`, `FunctionNotFound`)
/// are only ever produced by the host-side loader but are part of the
/// shared enumeration so both sides speak the same language.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkError {
    /// Operation attempted before a successful `initialise`.
    #[error("plugin is not initialised")]
    UnInitialized,

    /// No currently connected device matches the request.
    #[error("no matching devices are connected")]
    NoDevices,

    /// The device went away during I/O, or reconnection failed.
    #[error("device disconnected")]
    DeviceDisconnected,

    /// Unclassified failure.
    #[error("failure")]
    Failure,

    /// Malformed input to an entry point, e.g. a zero capacity where at
    /// least one slot is required.
    #[error("invalid argument")]
    InvalidArgument,

    /// The loader found no plugins.
    #[error("no plugins were found")]
    NoPlugins,

    /// The loader could not resolve an exported function.
    #[error("exported function not found")]
    FunctionNotFound,

    /// No mapping exists for the requested keycode.
    #[error("no mapping for the requested keycode")]
    NoMapping,

    /// The operation is not available on this platform or device.
    #[error("not available")]
    NotAvailable,
}

/// Result alias used across the plugin ABI.
pub type SdkResult<T> = Result<T, SdkError>;

impl SdkError {
    /// Check if this error indicates the device is currently unavailable
    /// (as opposed to a caller mistake or a permanent failure).
    pub fn is_device_unavailable(&self) -> bool {
        matches!(self, SdkError::NoDevices | SdkError::DeviceDisconnected)
    }

    /// Check if a later retry may succeed without the caller changing
    /// anything, e.g. after the device is plugged back in.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SdkError::NoDevices | SdkError::DeviceDisconnected | SdkError::UnInitialized
        )
    }
}
