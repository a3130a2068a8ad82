//! Content hashing (spec component A) - used to disambiguate
//! mtime-newer-but-identical files before issuing a redundant copy.

use crate::types::KopyError;
use sha2::Digest;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 8 * 1024;

/// Which digest to use when comparing file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgo {
    #[default]
    Blake3,
    Sha256,
}

/// Stream `path` in fixed-size chunks and return its hex digest under `algo`.
pub fn compute_hash(path: &Path, algo: HashAlgo) -> Result<String, KopyError> {
    let mut file = File::open(path).map_err(|e| KopyError::from_io_at(path, e))?;
    let mut buffer = vec![0u8; CHUNK_SIZE];

    match algo {
        HashAlgo::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            loop {
                let read = file
                    .read(&mut buffer)
                    .map_err(|e| KopyError::from_io_at(path, e))?;
                if read == 0 {
                    break;
                }
                hasher.update(&buffer[..read]);
            }
            Ok(hasher.finalize().to_hex().to_string())
        }
        HashAlgo::Sha256 => {
            let mut hasher = sha2::Sha256::new();
            loop {
                let read = file
                    .read(&mut buffer)
                    .map_err(|e| KopyError::from_io_at(path, e))?;
                if read == 0 {
                    break;
                }
                hasher.update(&buffer[..read]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_blake3_deterministic() {
        let f1 = write_temp(b"same content");
        let f2 = write_temp(b"same content");
        assert_eq!(
            compute_hash(f1.path(), HashAlgo::Blake3).unwrap(),
            compute_hash(f2.path(), HashAlgo::Blake3).unwrap()
        );
    }

    #[test]
    fn test_sha256_differs_on_different_content() {
        let f1 = write_temp(b"content a");
        let f2 = write_temp(b"content b");
        assert_ne!(
            compute_hash(f1.path(), HashAlgo::Sha256).unwrap(),
            compute_hash(f2.path(), HashAlgo::Sha256).unwrap()
        );
    }

    #[test]
    fn test_hash_empty_file() {
        let f = write_temp(b"");
        let hash = compute_hash(f.path(), HashAlgo::Blake3).unwrap();
        assert_eq!(hash.len(), 64); // blake3 hex digest is 32 bytes = 64 hex chars
    }

    #[test]
    fn test_hash_nonexistent_file_errors() {
        let result = compute_hash(Path::new("/nonexistent/file.bin"), HashAlgo::Blake3);
        assert!(result.is_err());
    }
}
