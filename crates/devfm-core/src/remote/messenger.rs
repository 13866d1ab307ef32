//! Outgoing side of the device transport.

use tokio::sync::mpsc::UnboundedSender;

use super::protocol::DeviceRequest;

/// Sink for requests to the device.
///
/// Sending never blocks and never fails from the caller's point of view:
/// the transport reports every outcome later as a
/// [`DeviceEvent`](super::protocol::DeviceEvent).
pub trait DeviceMessenger {
    fn send(&mut self, request: DeviceRequest);
}

/// Forwards requests over a tokio channel to a transport task, such as
/// [`spawn_folder_device`](super::folder::spawn_folder_device) or
/// [`spawn_sftp_device`](super::sftp::spawn_sftp_device).
#[derive(Debug, Clone)]
pub struct ChannelMessenger {
    tx: UnboundedSender<DeviceRequest>,
}

impl ChannelMessenger {
    pub fn new(tx: UnboundedSender<DeviceRequest>) -> Self {
        Self { tx }
    }
}

impl DeviceMessenger for ChannelMessenger {
    fn send(&mut self, request: DeviceRequest) {
        if let Err(e) = self.tx.send(request) {
            tracing::warn!("device transport is gone, dropping {:?}", e.0);
        }
    }
}
