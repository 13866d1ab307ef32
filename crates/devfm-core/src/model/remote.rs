//! Directory model backed by a remote device.
//!
//! [`RemoteDirectoryModel`] shows one directory of the device at a time.
//! It never reads the device directly: it sends [`DeviceRequest`]s through a
//! [`DeviceMessenger`] and applies the [`DeviceEvent`]s its owner feeds back
//! through [`RemoteDirectoryModel::handle_event`].
//!
//! The listing is replaced wholesale by each list response. Deletes and
//! renames are never patched in locally; their completion (success or
//! failure) triggers a fresh listing instead.

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{Entry, CURRENT_MARKER, PARENT_MARKER};
use crate::fs::validate_name;
use crate::model::signal::Signal;
use crate::model::{checked_row, DataChanged, HierarchicalDataSource, ModelIndex};
use crate::remote::messenger::DeviceMessenger;
use crate::remote::protocol::{DeviceEvent, DeviceRequest, RequestToken};

/// Whether a list request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState {
    Idle,
    /// Waiting for the response carrying this token.
    Listing(RequestToken),
}

/// A delete or rename the device refused, kept when failure reporting is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationFailure {
    Delete {
        path: String,
        reason: String,
    },
    Move {
        from: String,
        to: String,
        reason: String,
    },
}

/// [`HierarchicalDataSource`] over one directory of a remote device.
pub struct RemoteDirectoryModel<M> {
    messenger: M,
    path: Vec<String>,
    listing: Vec<Entry>,
    generation: u64,
    next_token: u64,
    state: ListingState,
    report_failures: bool,
    last_failure: Option<MutationFailure>,
    data_changed: Signal<DataChanged>,
}

impl<M: DeviceMessenger> RemoteDirectoryModel<M> {
    /// Creates a model at the device root and requests its listing.
    pub fn new(messenger: M) -> Self {
        let mut model = Self {
            messenger,
            path: Vec::new(),
            listing: Vec::new(),
            generation: 0,
            next_token: 0,
            state: ListingState::Idle,
            report_failures: false,
            last_failure: None,
            data_changed: Signal::new(),
        };
        model.invalidate();
        model
    }

    /// Keeps the last refused delete/rename for [`last_failure`](Self::last_failure).
    ///
    /// Recovery is unchanged: the listing is refreshed either way.
    pub fn with_failure_reporting(mut self, enabled: bool) -> Self {
        self.report_failures = enabled;
        self
    }

    /// Current directory as path segments; empty at the device root.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn state(&self) -> ListingState {
        self.state
    }

    pub fn entries(&self) -> &[Entry] {
        &self.listing
    }

    pub fn last_failure(&self) -> Option<&MutationFailure> {
        self.last_failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<MutationFailure> {
        self.last_failure.take()
    }

    /// Requests a fresh listing of the current directory.
    ///
    /// Only the response to the most recent request is applied; responses
    /// to earlier requests are dropped when they arrive.
    pub fn invalidate(&mut self) {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        let path = self.dir_path();
        tracing::debug!("device list {token} for {path:?}");
        self.state = ListingState::Listing(token);
        self.messenger.send(DeviceRequest::List { token, path });
    }

    /// Applies one completion from the device transport.
    pub fn handle_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Listed { token, entries } => {
                if self.accept_listing(token) {
                    self.apply_listing(entries);
                }
            }
            DeviceEvent::ListFailed { token, reason } => {
                if self.accept_listing(token) {
                    tracing::warn!("device list {token} failed: {reason}");
                    self.clear_listing();
                }
            }
            DeviceEvent::Deleted { path } => {
                tracing::debug!("device deleted {path}");
                self.invalidate();
            }
            DeviceEvent::DeleteFailed { path, reason } => {
                tracing::warn!("device delete of {path} failed: {reason}");
                self.record_failure(MutationFailure::Delete { path, reason });
                self.invalidate();
            }
            DeviceEvent::Moved { from, to } => {
                tracing::debug!("device moved {from} to {to}");
                self.invalidate();
            }
            DeviceEvent::MoveFailed { from, to, reason } => {
                tracing::warn!("device move of {from} to {to} failed: {reason}");
                self.record_failure(MutationFailure::Move { from, to, reason });
                self.invalidate();
            }
        }
    }

    /// Asks the device to delete `name` in the current directory.
    ///
    /// The listing is refreshed once the device answers.
    pub fn request_delete(&mut self, name: &str) -> CoreResult<()> {
        reject_navigation_entry(name)?;
        validate_name(name)?;
        let path = self.child_path(name);
        tracing::info!("device delete {path}");
        self.messenger.send(DeviceRequest::Delete { path });
        Ok(())
    }

    /// Asks the device to rename `old_name` to `new_name` in the current
    /// directory.
    ///
    /// Renaming an entry to its own name sends nothing.
    pub fn request_rename(&mut self, old_name: &str, new_name: &str) -> CoreResult<()> {
        reject_navigation_entry(old_name)?;
        validate_name(old_name)?;
        validate_name(new_name)?;
        if old_name == new_name {
            return Ok(());
        }
        let from = self.child_path(old_name);
        let to = self.child_path(new_name);
        tracing::info!("device move {from} to {to}");
        self.messenger.send(DeviceRequest::Move { from, to });
        Ok(())
    }

    fn accept_listing(&mut self, token: RequestToken) -> bool {
        if self.state != ListingState::Listing(token) {
            tracing::warn!("dropping stale device listing {token} (state {:?})", self.state);
            return false;
        }
        self.state = ListingState::Idle;
        true
    }

    fn apply_listing(&mut self, mut entries: Vec<Entry>) {
        // `.` and `..` from the device are dropped; `..` is synthesized below.
        entries.retain(Entry::is_editable);
        if !self.path.is_empty() {
            entries.push(Entry::parent_marker());
        }
        tracing::debug!(
            "device listing for {:?}: {} entries",
            self.dir_path(),
            entries.len()
        );
        self.listing = entries;
        self.generation += 1;
        self.data_changed.emit(&DataChanged {
            rows: 0..self.listing.len(),
        });
    }

    fn clear_listing(&mut self) {
        self.listing = Vec::new();
        self.generation += 1;
        self.data_changed.emit(&DataChanged { rows: 0..0 });
    }

    fn record_failure(&mut self, failure: MutationFailure) {
        if self.report_failures {
            self.last_failure = Some(failure);
        }
    }

    /// Device path of the current directory: `""` at the root, `"a/b"` below.
    fn dir_path(&self) -> String {
        self.path.join("/")
    }

    /// Device path of `name` in the current directory: `"/x"` at the root,
    /// `"a/b/x"` below.
    fn child_path(&self, name: &str) -> String {
        format!("{}/{}", self.dir_path(), name)
    }
}

fn reject_navigation_entry(name: &str) -> CoreResult<()> {
    if name == PARENT_MARKER || name == CURRENT_MARKER {
        return Err(CoreError::ParentMarker);
    }
    Ok(())
}

impl<M: DeviceMessenger> HierarchicalDataSource for RemoteDirectoryModel<M> {
    fn row_count(&self) -> usize {
        self.listing.len()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn entry(&self, index: ModelIndex) -> CoreResult<&Entry> {
        let row = checked_row(index, self.generation, self.listing.len())?;
        Ok(&self.listing[row])
    }

    fn is_directory(&self, index: ModelIndex) -> CoreResult<bool> {
        if index.is_root() {
            return Ok(true);
        }
        Ok(self.entry(index)?.is_dir())
    }

    fn root_index(&self) -> ModelIndex {
        ModelIndex::root(self.generation)
    }

    /// Pops the path for `..`, pushes the name for a directory, then
    /// requests the new listing. The current listing stays visible until
    /// the response arrives. Entering a file only refreshes.
    fn enter_directory(&mut self, index: ModelIndex) -> CoreResult<ModelIndex> {
        let entry = self.entry(index)?.clone();
        if entry.is_parent_marker() {
            self.path.pop();
        } else if entry.is_dir() {
            self.path.push(entry.name().to_string());
        }
        tracing::info!("device cwd is now {:?}", self.dir_path());
        self.invalidate();
        Ok(self.root_index())
    }

    fn set_name(&mut self, index: ModelIndex, new_name: &str) -> CoreResult<()> {
        let old_name = self.entry(index)?.name().to_string();
        self.request_rename(&old_name, new_name)
    }

    fn request_delete(&mut self, name: &str) -> CoreResult<()> {
        RemoteDirectoryModel::request_delete(self, name)
    }

    fn data_changed(&self) -> &Signal<DataChanged> {
        &self.data_changed
    }
}
