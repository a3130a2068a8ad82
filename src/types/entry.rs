//! FileEntry - metadata for a single file observed under a sync root

use std::path::PathBuf;
use std::time::SystemTime;

/// A single file (or symlink) discovered while scanning a sync root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the scan root, POSIX-normalized at construction time.
    pub path: PathBuf,
    pub size: u64,
    pub mtime: SystemTime,
    pub permissions: u32,
    pub is_symlink: bool,
    pub symlink_target: Option<PathBuf>,
}

impl FileEntry {
    pub fn new(path: PathBuf, size: u64, mtime: SystemTime, permissions: u32) -> Self {
        Self {
            path,
            size,
            mtime,
            permissions,
            is_symlink: false,
            symlink_target: None,
        }
    }

    pub fn new_symlink(
        path: PathBuf,
        size: u64,
        mtime: SystemTime,
        permissions: u32,
        target: PathBuf,
    ) -> Self {
        Self {
            path,
            size,
            mtime,
            permissions,
            is_symlink: true,
            symlink_target: Some(target),
        }
    }
}
