//! Directory listing entry.

use unicode_normalization::UnicodeNormalization;

/// Name of the synthetic entry that navigates one directory up.
pub const PARENT_MARKER: &str = "..";

/// Name of the current-directory entry. Never listed, never editable.
pub const CURRENT_MARKER: &str = ".";

/// A single file or directory in a listing.
///
/// `Entry` is an immutable value: listings are replaced wholesale, never
/// patched in place. Directory sizes are reported as `0`.
///
/// # Examples
///
/// ```
/// use devfm_core::Entry;
///
/// let entry = Entry::file("main.py", 120);
/// assert_eq!(entry.name(), "main.py");
/// assert!(!entry.is_dir());
/// assert!(Entry::parent_marker().is_parent_marker());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    is_dir: bool,
    size: u64,
}

impl Entry {
    /// Creates an entry. The size of a directory is forced to `0`.
    pub fn new(name: impl Into<String>, is_dir: bool, size: u64) -> Self {
        Self {
            name: name.into(),
            is_dir,
            size: if is_dir { 0 } else { size },
        }
    }

    /// Creates a regular-file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, false, size)
    }

    /// Creates a directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self::new(name, true, 0)
    }

    /// The synthetic `..` entry appended to non-root listings.
    pub fn parent_marker() -> Self {
        Self::dir(PARENT_MARKER)
    }

    /// Creates an entry from local filesystem metadata.
    ///
    /// macOS stores names decomposed (NFD); the name is re-composed to NFC
    /// so it compares and displays the same as names from the device.
    pub fn from_metadata(name: &str, metadata: &std::fs::Metadata) -> Self {
        let name: String = name.nfc().collect();
        Self::new(name, metadata.is_dir(), metadata.len())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// File size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns `true` for the synthetic `..` entry.
    pub fn is_parent_marker(&self) -> bool {
        self.name == PARENT_MARKER
    }

    /// Returns `true` if the entry may be renamed or deleted.
    ///
    /// `..` and `.` are navigation entries and never editable.
    pub fn is_editable(&self) -> bool {
        self.name != PARENT_MARKER && self.name != CURRENT_MARKER
    }
}
