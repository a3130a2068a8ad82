//! Atomic copy (spec component B) - write to a temp file on the destination
//! filesystem, then rename into place so a reader never observes a partial
//! write.

use crate::types::KopyError;
use filetime::{set_file_mtime, FileTime};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;
use std::time::SystemTime;

const COPY_CHUNK_SIZE: usize = 128 * 1024;

/// Copy `src` to `dst` atomically, preserving mtime and permissions, and
/// return the number of bytes written. Symlinks are replicated as symlinks,
/// never followed.
pub fn atomic_copy(src: &Path, dst: &Path) -> Result<u64, KopyError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| KopyError::from_io_at(parent, e))?;
    }

    let metadata = fs::symlink_metadata(src).map_err(|e| KopyError::from_io_at(src, e))?;

    if metadata.is_symlink() {
        copy_symlink(src, dst)?;
        return Ok(0);
    }

    let tmp_path = temp_path_for(dst);
    let written = stream_copy(src, &tmp_path);
    let written = match written {
        Ok(n) => n,
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
    };

    let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    if let Err(e) = set_file_mtime(&tmp_path, FileTime::from_system_time(mtime)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(KopyError::from_io_at(&tmp_path, e));
    }

    let perm = fs::Permissions::from_mode(metadata.permissions().mode());
    if let Err(e) = fs::set_permissions(&tmp_path, perm) {
        let _ = fs::remove_file(&tmp_path);
        return Err(KopyError::from_io_at(&tmp_path, e));
    }

    fs::rename(&tmp_path, dst).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        KopyError::from_io_at(dst, e)
    })?;

    Ok(written)
}

fn stream_copy(src: &Path, tmp_path: &Path) -> Result<u64, KopyError> {
    let mut reader = File::open(src).map_err(|e| KopyError::from_io_at(src, e))?;
    let mut writer = File::create(tmp_path).map_err(|e| KopyError::from_io_at(tmp_path, e))?;

    let mut buffer = vec![0u8; COPY_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|e| KopyError::from_io_at(src, e))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .map_err(|e| KopyError::from_io_at(tmp_path, e))?;
        total += read as u64;
    }
    writer
        .sync_all()
        .map_err(|e| KopyError::from_io_at(tmp_path, e))?;
    Ok(total)
}

fn copy_symlink(src: &Path, dst: &Path) -> Result<(), KopyError> {
    let target = fs::read_link(src).map_err(|e| KopyError::from_io_at(src, e))?;
    match fs::symlink_metadata(dst) {
        Ok(_) => fs::remove_file(dst).map_err(|e| KopyError::from_io_at(dst, e))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(KopyError::from_io_at(dst, e)),
    }
    symlink(&target, dst).map_err(|e| KopyError::from_io_at(dst, e))
}

/// Temp file name for an atomic copy, placed alongside the destination so
/// the final rename is guaranteed to stay on the same filesystem.
fn temp_path_for(dst: &Path) -> std::path::PathBuf {
    let file_name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pid = std::process::id();
    let unique = format!(".{file_name}.sync_tmp.{pid}");
    dst.with_file_name(unique)
}
