//! Streaming SHA-256 content hashing.

use crate::{BundleError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default read size when streaming file contents into the hasher (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash an in-memory buffer.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash everything a reader yields, `chunk_size` bytes at a time.
///
/// Memory use is bounded by the chunk size; the digest does not depend on it.
pub fn sha256_reader<R: Read>(mut reader: R, chunk_size: usize) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hash a file on disk with the default chunk size.
pub fn sha256_file(path: &Path) -> Result<String> {
    sha256_file_chunked(path, DEFAULT_CHUNK_SIZE)
}

/// Hash a file on disk with an explicit chunk size.
pub fn sha256_file_chunked(path: &Path, chunk_size: usize) -> Result<String> {
    let file = File::open(path).map_err(|e| BundleError::file_io(path, e))?;
    sha256_reader(file, chunk_size).map_err(|e| BundleError::file_io(path, e))
}

/// Whether a string looks like a hex SHA-256 digest.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.chars().all(|c| c.is_ascii_hexdigit())
}
