//! List models exposed to the view layer.
//!
//! Every pane is driven through the [`HierarchicalDataSource`] trait:
//!
//! - [`remote::RemoteDirectoryModel`]: one directory on the device, fetched
//!   asynchronously through a [`crate::remote::DeviceMessenger`].
//! - [`local::LocalDirectoryModel`]: one directory on the local filesystem.
//! - [`sorted::OrderedViewProxy`]: decorates either of the above with the
//!   `..`-first, directories-first, case-insensitive name ordering.
//!
//! Rows are named by [`ModelIndex`] values that carry the generation of the
//! listing they were created against. A model bumps its generation each time
//! the listing is replaced and rejects indices from older generations.

pub mod local;
pub mod remote;
pub mod signal;
pub mod sorted;

use std::ops::Range;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;
use signal::Signal;

/// Opaque handle naming one row of a listing, or the listing root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: Option<usize>,
    generation: u64,
}

impl ModelIndex {
    pub(crate) fn new(row: usize, generation: u64) -> Self {
        Self {
            row: Some(row),
            generation,
        }
    }

    pub(crate) fn root(generation: u64) -> Self {
        Self {
            row: None,
            generation,
        }
    }

    /// The row this index names, or `None` for the root sentinel.
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_root(&self) -> bool {
        self.row.is_none()
    }
}

/// Notification that rows of a model were replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChanged {
    /// Affected rows. Empty when the listing was cleared.
    pub rows: Range<usize>,
}

/// Icon hint for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Folder,
    File,
}

/// A flat listing of one directory, navigable by entering sub-directories.
///
/// Implemented by the local and device models and by the sorting proxy.
/// Indices are only valid until the next [`DataChanged`] published on
/// [`data_changed`](Self::data_changed).
pub trait HierarchicalDataSource {
    /// Number of rows in the current listing.
    fn row_count(&self) -> usize;

    /// Number of columns. Listings show the name only.
    fn column_count(&self) -> usize {
        1
    }

    /// Current listing generation; bumped on every listing replacement.
    fn generation(&self) -> u64;

    /// Returns the index of `row` in the current listing.
    fn index(&self, row: usize) -> CoreResult<ModelIndex> {
        let len = self.row_count();
        if row >= len {
            return Err(CoreError::IndexOutOfRange { row, len });
        }
        Ok(ModelIndex::new(row, self.generation()))
    }

    /// Returns the entry named by `index`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::StaleIndex`]: `index` predates the current listing.
    /// - [`CoreError::IndexOutOfRange`]: `index` is the root or past the end.
    fn entry(&self, index: ModelIndex) -> CoreResult<&Entry>;

    /// Display value of a row: the entry name.
    fn display_name(&self, index: ModelIndex) -> CoreResult<&str> {
        Ok(self.entry(index)?.name())
    }

    fn decoration(&self, index: ModelIndex) -> CoreResult<Decoration> {
        Ok(if self.is_directory(index)? {
            Decoration::Folder
        } else {
            Decoration::File
        })
    }

    /// Whether the row may be renamed. `false` for `..` and `.`.
    fn is_editable(&self, index: ModelIndex) -> CoreResult<bool> {
        Ok(self.entry(index)?.is_editable())
    }

    /// Whether `index` names a directory. The root is a directory.
    fn is_directory(&self, index: ModelIndex) -> CoreResult<bool>;

    /// The index standing for the listing itself (no row selected).
    fn root_index(&self) -> ModelIndex;

    /// Navigates into the directory at `index` (or up, for `..`).
    ///
    /// Returns the new root index. Depending on the model the new listing
    /// may arrive later through [`data_changed`](Self::data_changed).
    fn enter_directory(&mut self, index: ModelIndex) -> CoreResult<ModelIndex>;

    /// Edit entry point: renames the entry at `index` to `new_name`.
    fn set_name(&mut self, index: ModelIndex, new_name: &str) -> CoreResult<()>;

    /// Deletes the entry called `name` in the current directory.
    fn request_delete(&mut self, name: &str) -> CoreResult<()>;

    /// Signal published whenever the listing is replaced.
    fn data_changed(&self) -> &Signal<DataChanged>;
}

/// Checks `index` against a listing of `len` rows at `generation` and
/// returns its row.
pub(crate) fn checked_row(index: ModelIndex, generation: u64, len: usize) -> CoreResult<usize> {
    if index.generation != generation {
        return Err(CoreError::StaleIndex {
            index_generation: index.generation,
            current_generation: generation,
        });
    }
    match index.row {
        Some(row) if row < len => Ok(row),
        // The root sentinel does not name an entry.
        Some(row) => Err(CoreError::IndexOutOfRange { row, len }),
        None => Err(CoreError::IndexOutOfRange { row: len, len }),
    }
}
