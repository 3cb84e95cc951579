//! Evidence hashing - MD5, SHA-1, SHA-256 and BLAKE3 in a single pass.
//!
//! MD5 and SHA-1 are kept for matching against legacy case records and hash
//! sets; SHA-256 and BLAKE3 are the values to rely on.

use std::io::Read;
use std::path::Path;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::error::{ForensicError, Result};
use crate::readonly;
use crate::source::ByteSource;

/// Read chunk size for streamed hashing
pub const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// Lower-case hex digests of one byte stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashes {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub blake3: String,
}

/// Feeds every algorithm from the same chunks
pub struct MultiHasher {
    md5: Md5,
    sha1: Sha1,
    sha256: Sha256,
    // ~1.9 KiB of state
    blake3: Box<blake3::Hasher>,
    bytes: u64,
}

impl Default for MultiHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiHasher {
    pub fn new() -> Self {
        Self {
            md5: Md5::new(),
            sha1: Sha1::new(),
            sha256: Sha256::new(),
            blake3: Box::new(blake3::Hasher::new()),
            bytes: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.md5.update(data);
        self.sha1.update(data);
        self.sha256.update(data);
        self.blake3.update(data);
        self.bytes += data.len() as u64;
    }

    /// Bytes hashed so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn finalize(self) -> FileHashes {
        FileHashes {
            md5: hex::encode(self.md5.finalize()),
            sha1: hex::encode(self.sha1.finalize()),
            sha256: hex::encode(self.sha256.finalize()),
            blake3: self.blake3.finalize().to_hex().to_string(),
        }
    }
}

pub fn hash_bytes(data: &[u8]) -> FileHashes {
    let mut hasher = MultiHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Hash a reader to EOF in [`HASH_CHUNK_SIZE`] chunks
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<FileHashes> {
    let mut hasher = MultiHasher::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(hasher.finalize())
}

/// Hash a file opened read-only
pub fn hash_file(path: &Path) -> Result<FileHashes> {
    let file = readonly::open_readonly(path).map_err(|e| ForensicError::io(0, e))?;
    let hashes = hash_reader(std::io::BufReader::new(file)).map_err(|e| ForensicError::io(0, e))?;
    tracing::debug!(path = %path.display(), sha256 = %hashes.sha256, "Hashed file");
    Ok(hashes)
}

/// Hash an entire byte source through `read_range`
pub fn hash_source(source: &dyn ByteSource) -> Result<FileHashes> {
    let mut hasher = MultiHasher::new();
    let mut offset = 0u64;
    while offset < source.len() {
        let chunk = source.read_range(offset, HASH_CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }
        hasher.update(&chunk);
        offset += chunk.len() as u64;
    }
    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_known_vectors_abc() {
        let h = hash_bytes(b"abc");
        assert_eq!(h.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(h.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            h.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(h.blake3, blake3::hash(b"abc").to_hex().to_string());
    }

    #[test]
    fn test_empty_input() {
        let h = hash_bytes(b"");
        assert_eq!(h.md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            h.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_chunked_matches_one_shot() {
        let data: Vec<u8> = (0..HASH_CHUNK_SIZE * 2 + 17).map(|i| (i % 253) as u8).collect();
        let one_shot = hash_bytes(&data);
        assert_eq!(hash_reader(&data[..]).unwrap(), one_shot);
        assert_eq!(hash_source(&MemorySource::new(data)).unwrap(), one_shot);
    }

    #[test]
    fn test_hash_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.bin");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(b"abc"));
        assert!(hash_file(&dir.path().join("missing")).unwrap_err().is_io());
    }
}
