//! Error types for `devfm-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Transport failures on the
//! device side are never surfaced through this type: they become listing
//! state instead (see [`crate::model::remote`]).

use std::path::PathBuf;

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A file or directory name is invalid (empty, contains path separators, etc.).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A row index points past the end of the current listing.
    #[error("row {row} out of range (listing has {len} rows)")]
    IndexOutOfRange { row: usize, len: usize },

    /// An index was created before the listing it names was replaced.
    #[error("stale index: generation {index_generation}, model is at {current_generation}")]
    StaleIndex {
        index_generation: u64,
        current_generation: u64,
    },

    /// A rename or delete targeted the synthetic `..` entry.
    #[error("the parent entry cannot be renamed or deleted")]
    ParentMarker,

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `devfm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
