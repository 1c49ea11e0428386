//! Commit / Backup Protocol
//!
//! Rewrites the directory file from the index, keeping the previous
//! generation as the backup file.
//!
//! ## Steps
//! 1. Delete the old backup (failure ignored)
//! 2. Rename directory → backup (ignored if there is no directory yet)
//! 3. Create a fresh directory file (fails if one is still there)
//! 4. Write one record per entry, in index order
//! 5. Apply the configured permission bits
//!
//! A crash between 2 and 4 leaves a missing or partial directory file next
//! to a complete backup. Restoring from the backup is left to the operator.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PrelError, Result};
use crate::storage::apply_mode;

use super::{record, Index};

/// Writes the index to the directory file with a one-generation backup
#[derive(Debug, Clone)]
pub struct CommitProtocol {
    /// Directory file path
    dir_path: PathBuf,
    /// Backup file path
    bak_path: PathBuf,
    /// Permission bits for the new directory file
    mode: u32,
}

impl CommitProtocol {
    pub fn new(dir_path: &Path, bak_path: &Path, mode: u32) -> Self {
        Self {
            dir_path: dir_path.to_path_buf(),
            bak_path: bak_path.to_path_buf(),
            mode,
        }
    }

    /// Persist `index`, rotating the current directory file to the backup
    pub fn commit(&self, index: &Index) -> Result<()> {
        // Step 1: Drop the stale backup
        if let Err(e) = fs::remove_file(&self.bak_path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.bak_path.display(), error = %e, "failed to remove old backup");
            }
        }

        // Step 2: Current directory becomes the backup
        match fs::rename(&self.dir_path, &self.bak_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {} // first commit
            Err(e) => return Err(PrelError::Io(e)),
        }

        // Step 3: Fresh directory file; an existing one means step 2 did not move it
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.dir_path)?;
        let mut writer = BufWriter::new(file);

        // Step 4: One record per line
        for (key, location) in index.entries() {
            let line = record::encode(key, location)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        let file = writer
            .into_inner()
            .map_err(|e| PrelError::Io(e.into_error()))?;
        file.sync_all()?;
        drop(file);

        // Step 5: Permissions
        apply_mode(&self.dir_path, self.mode)?;

        debug!(path = %self.dir_path.display(), entries = index.len(), "committed directory");
        Ok(())
    }
}
