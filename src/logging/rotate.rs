//! Size-based rotating file writer.
//!
//! No crate in the dependency stack does size-based (as opposed to
//! time-based) rotation, so this is a small hand-rolled appender: at
//! `MAX_BYTES` the current file is renamed through `.log.1`..`.log.5`,
//! the oldest backup is discarded, and a fresh file is opened in its place.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_BACKUPS: u32 = 5;

pub struct RotatingFileWriter {
    path: PathBuf,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        for n in (1..MAX_BACKUPS).rev() {
            let from = backup_path(&self.path, n);
            let to = backup_path(&self.path, n + 1);
            if from.exists() {
                fs::rename(&from, &to)?;
            }
        }
        let first_backup = backup_path(&self.path, 1);
        fs::rename(&self.path, &first_backup)?;

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

fn backup_path(base: &Path, n: u32) -> PathBuf {
    let name = format!("{}.{n}", base.to_string_lossy());
    PathBuf::from(name)
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written >= MAX_BYTES {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Thread-safe handle usable as a `tracing_subscriber::fmt::MakeWriter`.
#[derive(Clone)]
pub struct SharedRotatingWriter(std::sync::Arc<Mutex<RotatingFileWriter>>);

impl SharedRotatingWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        Ok(Self(std::sync::Arc::new(Mutex::new(
            RotatingFileWriter::open(path)?,
        ))))
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRotatingWriter {
    type Writer = SharedRotatingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedRotatingWriterGuard(self.0.clone())
    }
}

pub struct SharedRotatingWriterGuard(std::sync::Arc<Mutex<RotatingFileWriter>>);

impl Write for SharedRotatingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("rotating writer poisoned").write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().expect("rotating writer poisoned").flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rotate_on_size_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("task.log");
        let mut writer = RotatingFileWriter::open(&path).unwrap();
        writer.written = MAX_BYTES;

        writer.write_all(b"rolled over").unwrap();

        assert!(backup_path(&path, 1).exists());
        assert_eq!(fs::read(&path).unwrap(), b"rolled over");
    }

    #[test]
    fn test_write_accumulates_below_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("task.log");
        let mut writer = RotatingFileWriter::open(&path).unwrap();

        writer.write_all(b"hello").unwrap();

        assert_eq!(writer.written, 5);
        assert!(!backup_path(&path, 1).exists());
    }
}
