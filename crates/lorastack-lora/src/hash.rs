//! Content hashing
//!
//! Registries index model files by the SHA-256 of their full content. Files
//! can be several gigabytes, so they are streamed through the hasher in fixed
//! chunks.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read size used while hashing
pub const HASH_CHUNK_SIZE: usize = 8192;

/// Hashing errors
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Read failed for {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// SHA-256 digest of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, as registries expect
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash everything readable from `reader`
pub fn sha256_reader(mut reader: impl Read) -> std::io::Result<ContentHash> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(ContentHash::from_digest(&hasher.finalize()))
}

/// Hash a file on disk
pub fn sha256_file(path: impl AsRef<Path>) -> Result<ContentHash, HashError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    sha256_reader(file).map_err(|source| HashError::Read {
        path: path.to_path_buf(),
        source,
    })
}
