//! File entry types and the local filesystem enumerator.
//!
//! [`entry::Entry`] is the record shared by both panes; [`local`] holds the
//! [`local::LocalEnumerator`] contract and its `std::fs` implementation.

pub mod entry;
pub mod local;

use crate::error::{CoreError, CoreResult};

/// Checks that `name` is a single path component usable as a file name.
///
/// Rejects empty names, `.`, `..`, and names containing `/` or NUL.
pub(crate) fn validate_name(name: &str) -> CoreResult<()> {
    let valid = !name.is_empty()
        && name != entry::CURRENT_MARKER
        && name != entry::PARENT_MARKER
        && !name.contains('/')
        && !name.contains('\0');
    #[cfg(windows)]
    let valid = valid && !name.contains('\\') && !name.contains(':');

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidName(name.to_string()))
    }
}
