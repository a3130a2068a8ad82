//! Safe delete (spec component B) - remove a single file/symlink or an empty
//! directory, mirroring the original's rmdir-vs-unlink split.

use crate::types::KopyError;
use std::fs;
use std::io;
use std::path::Path;

/// Remove `path`. Directories are removed only if empty; non-empty
/// directories are left alone and reported as an error rather than
/// recursively wiped, since the mirror invariant only ever targets
/// individual stale entries.
pub fn safe_delete(path: &Path) -> Result<(), KopyError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(KopyError::from_io_at(path, e)),
    };

    if metadata.is_dir() && !metadata.is_symlink() {
        fs::remove_dir(path).map_err(|e| KopyError::from_io_at(path, e))
    } else {
        fs::remove_file(path).map_err(|e| KopyError::from_io_at(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_safe_delete_removes_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"x").unwrap();

        safe_delete(&file).unwrap();

        assert!(!file.exists());
    }

    #[test]
    fn test_safe_delete_removes_empty_dir() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("empty");
        fs::create_dir(&sub).unwrap();

        safe_delete(&sub).unwrap();

        assert!(!sub.exists());
    }

    #[test]
    fn test_safe_delete_missing_path_is_noop() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.txt");

        let result = safe_delete(&missing);

        assert!(result.is_ok());
    }

    #[test]
    fn test_safe_delete_nonempty_dir_errors() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("full");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("child.txt"), b"x").unwrap();

        let result = safe_delete(&sub);

        assert!(result.is_err());
    }
}
