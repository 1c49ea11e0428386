//! # PrelDB
//!
//! A tiny persistent key-value store in the spirit of the classic "dumb"
//! dbm:
//! - A text directory file mapping keys to byte ranges
//! - A data file holding values on 512-byte block boundaries
//! - A one-generation backup of the directory on every commit
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │     get / set / delete / keys / entries / sync / close       │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!   ┌────────────────────────┐     ┌────────────────────────────┐
//!   │       Directory        │     │          Storage           │
//!   │  Index (key→Location)  │     │  BlockAllocator (append)   │
//!   │  CommitProtocol        │     │  ValueStore (read/write)   │
//!   └───────────┬────────────┘     └─────────────┬──────────────┘
//!               │                                │
//!               ▼                                ▼
//!        {path}.dir / .bak                  {path}.dat
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use preldb::OpenFlag;
//!
//! let db = preldb::open("foo", OpenFlag::Create, 0o666).unwrap();
//! db.set("bar", "bar").unwrap();
//! assert_eq!(db.get("bar").unwrap(), Some(b"bar".to_vec()));
//! db.close().unwrap();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod directory;
pub mod db;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PrelError, Result};
pub use config::{CommitPolicy, Config, OpenFlag};
pub use db::{Database, DbPaths};
pub use storage::{Location, BLOCKSIZE};

use std::path::PathBuf;

/// Open a database at `path` with the given flag and permission bits
///
/// Uses the default commit policy (commit after every mutation).
pub fn open(path: impl Into<PathBuf>, flag: OpenFlag, mode: u32) -> Result<Database> {
    let config = Config::builder().path(path).flag(flag).mode(mode).build();
    Database::open(config)
}

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PrelDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
