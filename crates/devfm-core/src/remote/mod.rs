//! Device transport contract and its implementations.
//!
//! The remote model talks to the device only through [`DeviceMessenger`]
//! and learns outcomes through [`DeviceEvent`]s. [`folder`] and [`sftp`]
//! provide transports that answer requests on a tokio task.

pub mod folder;
pub mod messenger;
pub mod protocol;
pub mod sftp;

pub use messenger::{ChannelMessenger, DeviceMessenger};
pub use protocol::{DeviceEvent, DeviceRequest, RequestToken};
