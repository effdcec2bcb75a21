//! MD5 content digests
//!
//! Files are hashed as a stream from offset 0 so memory use does not grow with
//! file size. The digest is only ever compared for equality, never persisted.

use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::{Error, Result};

/// A 128-bit content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest128([u8; 16]);

impl fmt::Display for Digest128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Compute the MD5 digest of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a read fails part way.
/// A partial digest is never returned.
pub fn compute_file_digest(path: &Path) -> Result<Digest128> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Md5::new();
    io::copy(&mut reader, &mut hasher).map_err(|e| Error::io(path, e))?;
    Ok(Digest128(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn digest_of(content: &str) -> Digest128 {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.bin");
        std::fs::write(&path, content).unwrap();
        compute_file_digest(&path).unwrap()
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(digest_of("test"), digest_of("test"));
    }

    #[test]
    fn different_content_different_digest() {
        assert_ne!(digest_of("aaa"), digest_of("bbb"));
    }

    #[test]
    fn digest_known_value() {
        assert_eq!(digest_of("hello world").to_string(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn empty_file_known_value() {
        assert_eq!(digest_of("").to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn large_file_is_streamed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("large.bin");
        std::fs::write(&path, vec![b'x'; 3 * 1024 * 1024]).unwrap();

        let first = compute_file_digest(&path).unwrap();
        assert_eq!(first, compute_file_digest(&path).unwrap());
        assert_ne!(first, digest_of("x"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = compute_file_digest(&dir.path().join("absent.bin"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
