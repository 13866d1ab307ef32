//! Directory model over the local filesystem.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::{Entry, CURRENT_MARKER, PARENT_MARKER};
use crate::fs::local::LocalEnumerator;
use crate::fs::validate_name;
use crate::model::signal::Signal;
use crate::model::{checked_row, DataChanged, HierarchicalDataSource, ModelIndex};

/// [`HierarchicalDataSource`] over one local directory.
///
/// Listings are read synchronously through the [`LocalEnumerator`]. A `..`
/// entry is shown whenever the current directory has a parent.
pub struct LocalDirectoryModel<E> {
    enumerator: E,
    home: PathBuf,
    current: PathBuf,
    show_hidden: bool,
    listing: Vec<Entry>,
    generation: u64,
    data_changed: Signal<DataChanged>,
}

impl<E: LocalEnumerator> LocalDirectoryModel<E> {
    /// Creates a model showing `home`, resolved to an absolute path.
    ///
    /// # Errors
    ///
    /// Fails if `home` cannot be resolved or listed.
    pub fn new(enumerator: E, home: impl Into<PathBuf>) -> CoreResult<Self> {
        let home = canonical_dir(home.into())?;
        let mut model = Self {
            enumerator,
            current: home.clone(),
            home,
            show_hidden: true,
            listing: Vec::new(),
            generation: 0,
            data_changed: Signal::new(),
        };
        model.listing = model.read_listing(&model.current)?;
        Ok(model)
    }

    /// Hides dot-files when `show_hidden` is `false`. Re-reads the listing.
    pub fn with_hidden(mut self, show_hidden: bool) -> CoreResult<Self> {
        self.show_hidden = show_hidden;
        self.refresh()?;
        Ok(self)
    }

    /// The directory the model started in.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The directory currently listed.
    pub fn current_dir(&self) -> &Path {
        &self.current
    }

    pub fn entries(&self) -> &[Entry] {
        &self.listing
    }

    /// Re-reads the current directory.
    ///
    /// On failure the listing is cleared before the error is returned.
    pub fn refresh(&mut self) -> CoreResult<()> {
        match self.read_listing(&self.current) {
            Ok(listing) => {
                self.replace_listing(listing);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("failed to list {}: {e}", self.current.display());
                self.replace_listing(Vec::new());
                Err(e)
            }
        }
    }

    fn read_listing(&self, dir: &Path) -> CoreResult<Vec<Entry>> {
        let mut listing: Vec<Entry> = self
            .enumerator
            .read_directory(dir)?
            .into_iter()
            .filter(|e| e.is_editable())
            .filter(|e| self.show_hidden || !e.name().starts_with('.'))
            .collect();
        if dir.parent().is_some() {
            listing.push(Entry::parent_marker());
        }
        Ok(listing)
    }

    fn replace_listing(&mut self, listing: Vec<Entry>) {
        self.listing = listing;
        self.generation += 1;
        self.data_changed.emit(&DataChanged {
            rows: 0..self.listing.len(),
        });
    }

    /// Filesystem path an entry of the current listing refers to.
    fn entry_path(&self, entry: &Entry) -> PathBuf {
        if entry.is_parent_marker() {
            self.current
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.current.clone())
        } else {
            self.current.join(entry.name())
        }
    }
}

/// Absolute, symlink-free form of `path`, so `..` always has a real parent.
fn canonical_dir(path: PathBuf) -> CoreResult<PathBuf> {
    std::fs::canonicalize(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CoreError::NotFound(path),
        std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path),
        _ => CoreError::Io(e),
    })
}

impl<E: LocalEnumerator> HierarchicalDataSource for LocalDirectoryModel<E> {
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
            return Ok(self.enumerator.is_dir(&self.current));
        }
        let entry = self.entry(index)?;
        Ok(self.enumerator.is_dir(&self.entry_path(entry)))
    }

    fn root_index(&self) -> ModelIndex {
        ModelIndex::root(self.generation)
    }

    /// Lists the target first and only moves there if that succeeds.
    /// Entering a file is a no-op.
    fn enter_directory(&mut self, index: ModelIndex) -> CoreResult<ModelIndex> {
        let entry = self.entry(index)?;
        let target = self.entry_path(entry);
        if !self.enumerator.is_dir(&target) {
            return Ok(self.root_index());
        }

        let listing = self.read_listing(&target)?;
        tracing::info!("local cwd is now {}", target.display());
        self.current = target;
        self.replace_listing(listing);
        Ok(self.root_index())
    }

    fn set_name(&mut self, index: ModelIndex, new_name: &str) -> CoreResult<()> {
        let entry = self.entry(index)?;
        if !entry.is_editable() {
            return Err(CoreError::ParentMarker);
        }
        validate_name(new_name)?;
        if entry.name() == new_name {
            return Ok(());
        }
        let path = self.current.join(entry.name());
        self.enumerator.rename_file(&path, new_name)?;
        // The rename happened; a failed re-read already cleared the listing.
        let _ = self.refresh();
        Ok(())
    }

    fn request_delete(&mut self, name: &str) -> CoreResult<()> {
        if name == PARENT_MARKER || name == CURRENT_MARKER {
            return Err(CoreError::ParentMarker);
        }
        validate_name(name)?;
        self.enumerator.delete_file(&self.current.join(name))?;
        let _ = self.refresh();
        Ok(())
    }

    fn data_changed(&self) -> &Signal<DataChanged> {
        &self.data_changed
    }
}
