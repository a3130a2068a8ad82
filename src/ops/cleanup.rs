//! Stale temp-file cleanup (spec component B) - removes leftover
//! `*.sync_tmp.*` files from a previous process that crashed mid-copy.

use crate::types::KopyError;
use std::fs;
use std::path::Path;

/// Walk `root` (non-recursively per directory encountered) and delete any
/// file whose name matches the atomic-copy temp naming scheme.
pub fn cleanup_tmp_files(root: &Path) -> Result<usize, KopyError> {
    let mut removed = 0;
    cleanup_dir(root, &mut removed)?;
    Ok(removed)
}

fn cleanup_dir(dir: &Path, removed: &mut usize) -> Result<(), KopyError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(KopyError::from_io_at(dir, e)),
    };

    for entry in entries {
        let entry = entry.map_err(|e| KopyError::from_io_at(dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| KopyError::from_io_at(&path, e))?;

        if file_type.is_dir() {
            cleanup_dir(&path, removed)?;
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if is_tmp_name(&name) {
            fs::remove_file(&path).map_err(|e| KopyError::from_io_at(&path, e))?;
            *removed += 1;
        }
    }

    Ok(())
}

fn is_tmp_name(name: &str) -> bool {
    name.starts_with('.') && name.contains(".sync_tmp.")
}
