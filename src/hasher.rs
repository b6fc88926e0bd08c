use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// BLAKE3 digest of the full file content as lowercase hex.
/// The file is streamed, so size does not matter.
pub fn content_hash(file: &Path) -> Result<String> {
    hash_file(file).map_err(|source| Error::FileRead {
        path: file.to_path_buf(),
        source,
    })
}

fn hash_file(file: &Path) -> io::Result<String> {
    let f = File::open(file)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, f);
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_hash_matches_in_memory_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.mscz");
        // larger than one read buffer
        let content = vec![0x5Au8; READ_BUFFER_SIZE * 3 + 17];
        fs::write(&path, &content).unwrap();

        let hash = content_hash(&path).unwrap();
        assert_eq!(hash, blake3::hash(&content).to_hex().to_string());
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_hash_differs_on_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.mscz");
        fs::write(&path, "first").unwrap();
        let first = content_hash(&path).unwrap();
        fs::write(&path, "second").unwrap();
        assert_ne!(first, content_hash(&path).unwrap());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = content_hash(&dir.path().join("gone.mscz")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
