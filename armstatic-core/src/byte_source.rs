//! Random-Access Byte Source
//!
//! The bottom of the data-flow chain (`ByteSource -> Container -> Function ->
//! ControlFlow -> Report`): a thin wrapper over an in-memory copy of the
//! object file that hands out byte ranges by file offset. Real random-access
//! I/O (pread-style) would go here in a variant that streams from disk; this
//! implementation loads the whole file once since object files analyzed by
//! this tool are not expected to exceed a few hundred megabytes.

use crate::error::{Error, Result};

/// Owns the raw bytes of one object file and answers bounded-range reads.
#[derive(Debug)]
pub struct ByteSource {
    data: Vec<u8>,
}

impl ByteSource {
    /// Load an object file from disk into memory.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self { data })
    }

    /// Wrap an already-loaded buffer (used by tests to avoid touching disk).
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn all(&self) -> &[u8] {
        &self.data
    }

    /// Read `len` bytes starting at file offset `offset`.
    ///
    /// # Errors
    /// Returns `Error::TruncatedFile` if the requested range runs past the
    /// end of the buffer.
    pub fn read(&self, offset: u64, len: u64) -> Result<&[u8]> {
        let start = offset as usize;
        let end = start
            .checked_add(len as usize)
            .ok_or_else(|| Error::TruncatedFile(format!("offset {offset} + len {len} overflows")))?;
        self.data.get(start..end).ok_or_else(|| {
            Error::TruncatedFile(format!(
                "range [{start}, {end}) exceeds file size {}",
                self.data.len()
            ))
        })
    }
}
