//! Value Store
//!
//! Positional reads and writes against the data file. Every call opens
//! and closes its own handle; no cursor state survives between calls.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

use super::Location;

/// Raw byte access to the data file
#[derive(Debug, Clone)]
pub struct ValueStore {
    /// Path of the data file
    path: PathBuf,
}

impl ValueStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read up to `location.length` bytes at `location.offset`
    ///
    /// A short read (the file ends early) returns only the bytes that were
    /// there rather than failing.
    pub fn read(&self, location: Location) -> Result<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        let available = file.metadata()?.len().saturating_sub(location.offset);
        let wanted = location.length.min(available);

        if wanted < location.length {
            debug!(
                offset = location.offset,
                expected = location.length,
                got = wanted,
                "short read from data file"
            );
        }
        if wanted == 0 {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(location.offset))?;

        // `wanted` is bounded by the file size, whatever the directory claims
        let mut value = Vec::with_capacity(wanted as usize);
        file.take(wanted).read_to_end(&mut value)?;

        Ok(value)
    }

    /// Overwrite bytes starting at `location.offset`
    ///
    /// No bounds checking against other values: the caller guarantees the
    /// region reserved at `location.offset` can hold `value`.
    pub fn write(&self, location: Location, value: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)?;

        file.seek(SeekFrom::Start(location.offset))?;
        file.write_all(value)?;

        Ok(())
    }

    /// Flush the data file to disk
    ///
    /// Must run before the directory that points at new bytes is committed.
    pub fn sync(&self) -> Result<()> {
        OpenOptions::new()
            .write(true)
            .open(&self.path)?
            .sync_data()?;
        Ok(())
    }
}
