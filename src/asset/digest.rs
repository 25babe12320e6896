//! Content digests for asset versioning.
//!
//! A digest depends on file bytes only: the same bytes always yield the
//! same token, across runs and machines.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Length of a digest in hex characters (128 bits).
pub const DIGEST_LEN: usize = 32;

const BUF_SIZE: usize = 64 * 1024;

/// Hex-encoded, truncated blake3 hash of a file's contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Digest an in-memory buffer.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self::from_hash(blake3::hash(data))
    }

    fn from_hash(hash: blake3::Hash) -> Self {
        let mut hex = hex::encode(hash.as_bytes());
        hex.truncate(DIGEST_LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read a whole file (blocking) and digest its contents.
pub fn digest_file(path: &Path) -> io::Result<Digest> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BUF_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(Digest::from_hash(hasher.finalize()))
}
