//! Storage Module
//!
//! The data file: raw value bytes laid out on block boundaries.
//!
//! ## Responsibilities
//! - Append new values at block-aligned offsets (`BlockAllocator`)
//! - Positional reads and in-place overwrites (`ValueStore`)
//!
//! ## File Format
//! ```text
//! offset 0      512           1024          1536
//! ┌─────────────┬─────────────┬─────────────┬──────
//! │ value A     │ value B (spans two blocks)│ ...
//! │ [bytes][00] │ [bytes .................][00]
//! └─────────────┴─────────────┴─────────────┴──────
//! ```
//! Offsets are absolute byte positions. The block size only decides where
//! a new value may start; the gap up to the boundary is zero-filled.
//! Space behind overwritten-and-moved or deleted values is never reused.

mod allocator;
mod value_store;

#[cfg(unix)]
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use allocator::BlockAllocator;
pub use value_store::ValueStore;

/// Allocation granularity of the data file
pub const BLOCKSIZE: u64 = 512;

/// Byte range of one value inside the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Absolute byte offset (always a multiple of `BLOCKSIZE`)
    pub offset: u64,
    /// Number of value bytes
    pub length: u64,
}

impl Location {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Number of blocks reserved for this value
    pub fn blocks(&self) -> u64 {
        blocks_for(self.length)
    }

    /// End of the value bytes (exclusive)
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Blocks needed to hold `length` bytes: `ceil(length / BLOCKSIZE)`
pub fn blocks_for(length: u64) -> u64 {
    length.div_ceil(BLOCKSIZE)
}

/// Round `pos` up to the next block boundary
pub fn align_up(pos: u64) -> u64 {
    blocks_for(pos) * BLOCKSIZE
}

/// Apply permission bits to a file
#[cfg(unix)]
pub(crate) fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

/// Permission bits are a unix concept; elsewhere this does nothing
#[cfg(not(unix))]
pub(crate) fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
