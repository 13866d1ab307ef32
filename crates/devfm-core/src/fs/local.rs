//! Local filesystem enumerator.
//!
//! [`LocalEnumerator`] is the contract the local pane consumes: list a
//! directory, test whether a path is a directory, delete and rename.
//! [`StdEnumerator`] implements it on top of `std::fs`.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;
use crate::fs::validate_name;

/// Hierarchical file enumerator backing the local pane.
pub trait LocalEnumerator {
    /// Lists the immediate children of `path`, unsorted, without `.` or `..`.
    fn read_directory(&self, path: &Path) -> CoreResult<Vec<Entry>>;
    /// Returns `true` if `path` names an existing directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// Deletes a file, or a directory recursively.
    fn delete_file(&self, path: &Path) -> CoreResult<()>;
    /// Renames `path` to `new_name` within the same parent directory.
    fn rename_file(&self, path: &Path, new_name: &str) -> CoreResult<()>;
}

/// [`LocalEnumerator`] over the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnumerator;

impl LocalEnumerator for StdEnumerator {
    /// # Errors
    ///
    /// - [`CoreError::NotFound`]: the path does not exist.
    /// - [`CoreError::NotADirectory`]: the path is not a directory.
    /// - [`CoreError::PermissionDenied`]: read access is denied.
    fn read_directory(&self, path: &Path) -> CoreResult<Vec<Entry>> {
        if !path.exists() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(CoreError::NotADirectory(path.to_path_buf()));
        }

        let read_dir = std::fs::read_dir(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                CoreError::PermissionDenied(path.to_path_buf())
            } else {
                CoreError::Io(e)
            }
        })?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            // Follow symlinks so a link to a directory lists as one; a
            // dangling link falls back to the link itself.
            let metadata = match std::fs::metadata(dir_entry.path())
                .or_else(|_| dir_entry.metadata())
            {
                Ok(m) => m,
                Err(_) => continue,
            };
            let name = dir_entry.file_name();
            entries.push(Entry::from_metadata(&name.to_string_lossy(), &metadata));
        }

        Ok(entries)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn delete_file(&self, path: &Path) -> CoreResult<()> {
        // symlink_metadata so a link to a directory is removed, not followed
        let meta = std::fs::symlink_metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::NotFound(path.to_path_buf())
            } else {
                CoreError::Io(e)
            }
        })?;

        if meta.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rename_file(&self, path: &Path, new_name: &str) -> CoreResult<()> {
        if std::fs::symlink_metadata(path).is_err() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }
        validate_name(new_name)?;

        let parent = path
            .parent()
            .ok_or_else(|| CoreError::InvalidName("no parent directory".to_string()))?;
        std::fs::rename(path, parent.join(new_name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[Entry]) -> Vec<&str> {
        let mut names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        names.sort();
        names
    }

    #[test]
    fn read_directory_lists_files_and_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "abc").unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();

        let entries = StdEnumerator.read_directory(tmp.path()).unwrap();
        assert_eq!(names(&entries), vec!["a.txt", "docs"]);

        let docs = entries.iter().find(|e| e.name() == "docs").unwrap();
        assert!(docs.is_dir());
        let file = entries.iter().find(|e| e.name() == "a.txt").unwrap();
        assert_eq!(file.size(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn read_directory_follows_directory_symlinks() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("target")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("target"), tmp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("dangling")).unwrap();

        let entries = StdEnumerator.read_directory(tmp.path()).unwrap();
        assert_eq!(names(&entries), vec!["dangling", "link", "target"]);

        let link = entries.iter().find(|e| e.name() == "link").unwrap();
        assert!(link.is_dir());
        let dangling = entries.iter().find(|e| e.name() == "dangling").unwrap();
        assert!(!dangling.is_dir());
    }

    #[test]
    fn read_directory_empty() {
        let tmp = TempDir::new().unwrap();
        let entries = StdEnumerator.read_directory(tmp.path()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn read_directory_missing_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = StdEnumerator.read_directory(&tmp.path().join("nope"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn read_directory_on_file_returns_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "").unwrap();

        let result = StdEnumerator.read_directory(&file);
        assert!(matches!(result.unwrap_err(), CoreError::NotADirectory(_)));
    }

    #[test]
    fn is_dir_distinguishes_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "").unwrap();

        assert!(StdEnumerator.is_dir(tmp.path()));
        assert!(!StdEnumerator.is_dir(&file));
        assert!(!StdEnumerator.is_dir(&tmp.path().join("missing")));
    }

    #[test]
    fn delete_file_directory_recursive() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("dir_to_delete");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("inside.txt"), "").unwrap();

        StdEnumerator.delete_file(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn delete_file_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = StdEnumerator.delete_file(&tmp.path().join("nope.txt"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn rename_file_regular() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("old_name.txt");
        fs::write(&file, "content").unwrap();

        StdEnumerator.rename_file(&file, "new_name.txt").unwrap();

        assert!(!file.exists());
        let new_path = tmp.path().join("new_name.txt");
        assert_eq!(fs::read_to_string(new_path).unwrap(), "content");
    }

    #[test]
    fn rename_file_rejects_separator() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "").unwrap();

        let result = StdEnumerator.rename_file(&file, "a/b");
        assert!(matches!(result.unwrap_err(), CoreError::InvalidName(_)));
        assert!(file.exists());
    }
}
