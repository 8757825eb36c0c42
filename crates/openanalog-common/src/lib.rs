//! Shared types for the OpenAnalog plugin ABI.
//!
//! This crate carries everything that crosses the boundary between an SDK
//! host and a plugin: device descriptors, connect/disconnect events, and
//! the closed set of status codes. Plugins and hosts depend on this crate
//! only, never on each other's internals.

pub mod device_info;
pub mod events;
pub mod result;

pub use device_info::*;
pub use events::*;
pub use result::*;
