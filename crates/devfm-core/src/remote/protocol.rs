//! Request and completion types exchanged with the device transport.
//!
//! [`DeviceRequest`]s flow **model → device**; the transport answers each
//! with exactly one [`DeviceEvent`] flowing **device → model**. Paths are
//! device-side strings with `/` separators, relative to the device root.

use std::fmt;

use crate::fs::entry::Entry;

/// Sequence number attached to a list request and echoed by its response.
///
/// Tokens increase monotonically per model, so a response can be matched
/// against the latest request issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An operation the model asks the device to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceRequest {
    /// List the directory at `path` (`""` for the device root).
    List { token: RequestToken, path: String },
    /// Delete the file or directory at `path`. Directories are removed
    /// together with their contents on every transport.
    Delete { path: String },
    /// Move or rename `from` to `to`.
    Move { from: String, to: String },
}

/// Completion of a [`DeviceRequest`], delivered on the model's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A directory listing arrived, in device order.
    Listed {
        token: RequestToken,
        entries: Vec<Entry>,
    },
    /// The device could not list the directory.
    ListFailed { token: RequestToken, reason: String },
    Deleted { path: String },
    DeleteFailed { path: String, reason: String },
    Moved { from: String, to: String },
    MoveFailed {
        from: String,
        to: String,
        reason: String,
    },
}

impl DeviceRequest {
    /// Builds the failure event answering this request.
    ///
    /// Transports use this when the request could not be carried out at all,
    /// e.g. because the link is down.
    pub fn failed(&self, reason: impl Into<String>) -> DeviceEvent {
        let reason = reason.into();
        match self {
            Self::List { token, .. } => DeviceEvent::ListFailed {
                token: *token,
                reason,
            },
            Self::Delete { path } => DeviceEvent::DeleteFailed {
                path: path.clone(),
                reason,
            },
            Self::Move { from, to } => DeviceEvent::MoveFailed {
                from: from.clone(),
                to: to.clone(),
                reason,
            },
        }
    }
}
