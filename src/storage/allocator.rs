//! Block Allocator
//!
//! Appends new values to the end of the data file on block boundaries.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

use super::{align_up, Location, BLOCKSIZE};

/// Zero filler, long enough for any pad run (pad is always < BLOCKSIZE)
const FILLER: [u8; BLOCKSIZE as usize] = [0u8; BLOCKSIZE as usize];

/// Append-only allocator over the data file
///
/// There is no free list: the allocator is the only thing that grows the
/// data file and it never revisits space behind the current end.
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    /// Path of the data file
    path: PathBuf,
}

impl BlockAllocator {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Append `value` at the first block boundary at or after the current
    /// end of file, zero-filling the gap.
    ///
    /// The file size is read fresh on every call, never cached.
    pub fn append(&self, value: &[u8]) -> Result<Location> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;

        let pos = file.metadata()?.len();
        let aligned = align_up(pos);
        let pad = (aligned - pos) as usize;

        if pad > 0 {
            file.write_all(&FILLER[..pad])?;
        }
        file.write_all(value)?;

        let location = Location::new(aligned, value.len() as u64);
        debug!(
            offset = location.offset,
            length = location.length,
            pad,
            "allocated value"
        );

        Ok(location)
    }

    /// Current size of the data file in bytes
    pub fn end_of_file(&self) -> Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }
}
