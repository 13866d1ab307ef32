//! devfm core library: UI-agnostic data models for a dual-pane file browser.
//!
//! One pane mirrors the local filesystem, the other the filesystem of a
//! remote device reachable only through asynchronous list/move/delete
//! requests. Both are exposed to a frontend as [`HierarchicalDataSource`]s.
//!
//! # Modules
//!
//! - [`fs`]: the [`Entry`] record and the local filesystem enumerator.
//! - [`model`]: the data-source contract, the local and device models, and
//!   the sorting proxy.
//! - [`remote`]: device request/completion types and transports.
//! - [`nav`]: cursor panes and the dual-pane pair.
//! - [`config`]: TOML configuration.
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).
//!
//! All models are single-threaded: operations and device completions must
//! be delivered on the same thread.

pub mod config;
pub mod error;
pub mod fs;
pub mod model;
pub mod nav;
pub mod remote;

pub use config::settings::{Config, DeviceBackend};
pub use error::{CoreError, CoreResult};
pub use fs::entry::{Entry, PARENT_MARKER};
pub use fs::local::{LocalEnumerator, StdEnumerator};
pub use model::local::LocalDirectoryModel;
pub use model::remote::{ListingState, MutationFailure, RemoteDirectoryModel};
pub use model::signal::{Signal, SubscriptionId};
pub use model::sorted::{compare_entries, OrderedViewProxy};
pub use model::{DataChanged, Decoration, HierarchicalDataSource, ModelIndex};
pub use nav::pane::{DualPane, Pane, PaneView, Side};
pub use remote::folder::spawn_folder_device;
pub use remote::sftp::{spawn_sftp_device, RemoteSession, SftpConfig, SftpError};
pub use remote::{ChannelMessenger, DeviceEvent, DeviceMessenger, DeviceRequest, RequestToken};
