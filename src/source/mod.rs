//! Byte sources - random-access, read-only views over disk images.
//!
//! The engine never needs an image resident in memory; it only asks for
//! `len()` and `read_range(offset, len)`. Reads past the end are truncated,
//! and a read that starts at or beyond the end returns an empty buffer.
//!
//! - [`MemorySource`]: owned bytes (tests, small buffers, remote fetches)
//! - [`FileSource`]: positional reads through a file handle; read errors are
//!   never retried
//! - [`MmapSource`]: zero-copy access to multi-GB images via `memmap2`

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{ForensicError, Result};
use crate::readonly;

/// Random-access, read-only byte source
pub trait ByteSource: Send + Sync {
    /// Total length in bytes
    fn len(&self) -> u64;

    /// Read up to `len` bytes starting at `offset`.
    ///
    /// Returns fewer bytes when the range crosses the end of the source and an
    /// empty buffer when `offset >= self.len()`.
    fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Clamp a requested read to the bounds of a source of `total` bytes
fn clamp_len(total: u64, offset: u64, len: usize) -> usize {
    if offset >= total {
        0
    } else {
        (total - offset).min(len as u64) as usize
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Byte source over an owned buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let n = clamp_len(self.len(), offset, len);
        if n == 0 {
            return Ok(Vec::new());
        }
        let start = offset as usize;
        Ok(self.data[start..start + n].to_vec())
    }
}

// ============================================================================
// File handle
// ============================================================================

/// Byte source backed by a read-only file handle.
///
/// Reads seek and fill under a lock, so a single handle can be shared across
/// tasks. Any read error surfaces immediately as [`ForensicError::IoFailure`];
/// only `Interrupted` reads are resumed.
pub struct FileSource {
    path: PathBuf,
    file: Mutex<File>,
    len: u64,
}

impl FileSource {
    /// Open an image read-only
    pub fn open(path: &Path) -> Result<Self> {
        let file = readonly::open_readonly(path).map_err(|e| ForensicError::io(0, e))?;
        let len = file.metadata().map_err(|e| ForensicError::io(0, e))?.len();

        tracing::debug!(path = %path.display(), len, "Opened file source");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let n = clamp_len(self.len, offset, len);
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0u8; n];
        let got = read_at(&mut *self.file.lock(), offset, &mut buf).map_err(|e| {
            tracing::warn!(path = %self.path.display(), offset, error = %e, "Read failed");
            e
        })?;
        buf.truncate(got);
        Ok(buf)
    }
}

/// Seek to `offset` and fill `buf`; the first error is returned as-is
fn read_at<R: Read + Seek>(reader: &mut R, offset: u64, buf: &mut [u8]) -> Result<usize> {
    reader
        .seek(SeekFrom::Start(offset))
        .and_then(|_| read_fully(reader, buf))
        .map_err(|e| ForensicError::io(offset, e))
}

/// Fill `buf` until it is full or the reader hits EOF; returns bytes read
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ============================================================================
// Memory map
// ============================================================================

/// Byte source backed by a read-only memory map
pub struct MmapSource {
    path: PathBuf,
    // Zero-length files cannot be mapped on every platform
    mmap: Option<memmap2::Mmap>,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = readonly::open_readonly(path).map_err(|e| ForensicError::io(0, e))?;
        let len = file.metadata().map_err(|e| ForensicError::io(0, e))?.len();

        let mmap = if len == 0 {
            None
        } else {
            Some(unsafe { memmap2::Mmap::map(&file).map_err(|e| ForensicError::io(0, e))? })
        };

        tracing::debug!(path = %path.display(), len, "Mapped image");

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

impl ByteSource for MmapSource {
    fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let data = self.as_bytes();
        let n = clamp_len(data.len() as u64, offset, len);
        if n == 0 {
            return Ok(Vec::new());
        }
        let start = offset as usize;
        Ok(data[start..start + n].to_vec())
    }
}

/// How a CLI/host should open an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Positional reads through a file handle
    #[default]
    File,
    /// Memory-map the whole image
    Mmap,
}

/// Open an image with the requested access strategy
pub fn open_image(path: &Path, mode: OpenMode) -> Result<Box<dyn ByteSource>> {
    Ok(match mode {
        OpenMode::File => Box::new(FileSource::open(path)?),
        OpenMode::Mmap => Box::new(MmapSource::open(path)?),
    })
}
