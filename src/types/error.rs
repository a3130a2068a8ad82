//! Error taxonomy for kopy-watch

use std::path::PathBuf;
use thiserror::Error;

/// Error types produced anywhere in the sync pipeline
#[derive(Debug, Error)]
pub enum KopyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Disk full: {available} bytes available, {needed} bytes needed")]
    DiskFull { available: u64, needed: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watcher error: {0}")]
    Watcher(String),

    #[error("Pass error in task '{task}': {message}")]
    Pass { task: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl KopyError {
    /// Map a raw IO error to the richer variants where we can tell more from
    /// the `ErrorKind`/raw OS error, falling back to the generic `Io` variant.
    pub fn from_io_at(path: &std::path::Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        if error.kind() == ErrorKind::PermissionDenied {
            return KopyError::PermissionDenied {
                path: path.to_path_buf(),
            };
        }

        let is_disk_full = error.kind() == ErrorKind::StorageFull
            || matches!(error.raw_os_error(), Some(28 | 122));
        if is_disk_full {
            return KopyError::DiskFull {
                available: 0,
                needed: 1,
            };
        }

        KopyError::Io(error)
    }
}
