//! Database Module
//!
//! The public handle that ties the data file, the index and the commit
//! protocol together.
//!
//! ## Responsibilities
//! - Place values (fresh allocation vs. in-place overwrite)
//! - Keep the index and the directory file in step (auto-commit)
//! - Enforce the Open → Closed lifecycle

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{CommitPolicy, Config, OpenFlag};
use crate::directory::{CommitProtocol, Index};
use crate::error::{PrelError, Result};
use crate::storage::{apply_mode, blocks_for, BlockAllocator, Location, ValueStore};

/// The three files behind one database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbPaths {
    /// `{base}.dir`
    pub dir: PathBuf,
    /// `{base}.dat`
    pub dat: PathBuf,
    /// `{base}.bak`
    pub bak: PathBuf,
}

impl DbPaths {
    /// Derive the file names by appending an extension to `base`
    pub fn from_base(base: &Path) -> Self {
        let with_ext = |ext: &str| {
            let mut name = OsString::from(base.as_os_str());
            name.push(ext);
            PathBuf::from(name)
        };

        Self {
            dir: with_ext(".dir"),
            dat: with_ext(".dat"),
            bak: with_ext(".bak"),
        }
    }
}

/// Everything that only exists while the database is open
struct State {
    index: Index,
    allocator: BlockAllocator,
    values: ValueStore,
    committer: CommitProtocol,
    policy: CommitPolicy,
    /// Mutations left before the next automatic commit
    countdown: usize,
    /// Mutations since the last commit
    pending: usize,
}

impl State {
    fn commit(&mut self) -> Result<()> {
        // Value bytes reach disk before any directory record points at them
        self.values.sync()?;
        self.committer.commit(&self.index)?;
        self.pending = 0;
        self.countdown = self.policy.threshold();
        Ok(())
    }

    /// Count one mutation and commit when the countdown runs out
    fn record_mutation(&mut self) -> Result<()> {
        self.pending += 1;
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.commit()?;
        }
        Ok(())
    }
}

/// A handle to an open database
///
/// ## Concurrency
/// All operations take `&self`; state sits behind one mutex so calls from
/// several threads are serialized. Two handles over the same files are
/// not coordinated in any way.
///
/// ## Lifecycle
/// Open until `close()`. Every later call, including a second `close()`,
/// fails with `PrelError::Closed`.
pub struct Database {
    paths: DbPaths,
    /// `None` once closed
    state: Mutex<Option<State>>,
}

impl Database {
    /// Open or create a database
    ///
    /// On startup:
    /// 1. With `OpenFlag::Reset`, remove existing files (errors ignored)
    /// 2. Create the data file if missing
    /// 3. Load the directory file (missing or malformed means empty)
    pub fn open(config: Config) -> Result<Self> {
        config.commit_policy.validate()?;

        let paths = DbPaths::from_base(&config.path);

        // Step 1: Reset
        if config.flag == OpenFlag::Reset {
            for path in [&paths.dir, &paths.dat, &paths.bak] {
                if let Err(e) = fs::remove_file(path) {
                    if e.kind() != ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %e, "failed to remove file on reset");
                    }
                }
            }
        }

        // Step 2: Data file
        if !paths.dat.exists() {
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(&paths.dat)?;
            apply_mode(&paths.dat, config.mode)?;
        }

        // Step 3: Index
        let index = Index::load(&paths.dir);

        info!(
            path = %config.path.display(),
            flag = ?config.flag,
            entries = index.len(),
            "opened database"
        );

        let state = State {
            index,
            allocator: BlockAllocator::new(&paths.dat),
            values: ValueStore::new(&paths.dat),
            committer: CommitProtocol::new(&paths.dir, &paths.bak, config.mode),
            policy: config.commit_policy,
            countdown: config.commit_policy.threshold(),
            pending: 0,
        };

        Ok(Self {
            paths,
            state: Mutex::new(Some(state)),
        })
    }

    /// Open with a base path (convenience method)
    ///
    /// Uses default config with the specified base path
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Run `f` against the open state, or fail with `Closed`
    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut guard = self.state.lock();
        let state = guard.as_mut().ok_or(PrelError::Closed)?;
        f(state)
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.with_state(|state| match state.index.lookup(key) {
            Some(location) => state.values.read(location).map(Some),
            None => Ok(None),
        })
    }

    /// Store `value` under `key`
    ///
    /// A value that fits in the blocks already reserved for the key is
    /// overwritten in place; anything larger goes to a fresh allocation
    /// at the end of the data file and the old bytes are abandoned.
    pub fn set(&self, key: &str, value: impl AsRef<[u8]>) -> Result<()> {
        let value = value.as_ref();
        let length = value.len() as u64;

        self.with_state(|state| {
            let location = match state.index.lookup(key) {
                Some(old) if blocks_for(length) <= old.blocks() => {
                    let location = Location::new(old.offset, length);
                    state.values.write(location, value)?;
                    debug!(key, offset = location.offset, length, "overwrote value in place");
                    location
                }
                _ => state.allocator.append(value)?,
            };

            state.index.upsert(key, location);
            state.record_mutation()
        })
    }

    /// Remove `key`
    ///
    /// Returns `false` if the key was not present. The value's bytes stay
    /// in the data file.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.with_state(|state| match state.index.remove(key) {
            Some(_) => {
                state.record_mutation()?;
                Ok(true)
            }
            None => Ok(false),
        })
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.with_state(|state| Ok(state.index.contains(key)))
    }

    /// All keys, in first-insertion order
    pub fn keys(&self) -> Result<Vec<String>> {
        self.with_state(|state| Ok(state.index.keys().map(str::to_owned).collect()))
    }

    /// All (key, location) pairs, in first-insertion order
    pub fn entries(&self) -> Result<Vec<(String, Location)>> {
        self.with_state(|state| {
            Ok(state
                .index
                .entries()
                .map(|(key, location)| (key.to_owned(), location))
                .collect())
        })
    }

    /// Where `key`'s value currently lives in the data file
    pub fn location(&self, key: &str) -> Result<Option<Location>> {
        self.with_state(|state| Ok(state.index.lookup(key)))
    }

    pub fn len(&self) -> Result<usize> {
        self.with_state(|state| Ok(state.index.len()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.with_state(|state| Ok(state.index.is_empty()))
    }

    /// Commit the index to the directory file now
    ///
    /// Safe to call with nothing pending; the same state is written again.
    pub fn sync(&self) -> Result<()> {
        self.with_state(|state| state.commit())
    }

    /// Change the auto-commit policy; restarts the countdown
    pub fn set_commit_policy(&self, policy: CommitPolicy) -> Result<()> {
        policy.validate()?;
        self.with_state(|state| {
            state.policy = policy;
            state.countdown = policy.threshold();
            Ok(())
        })
    }

    /// Mutations not yet written to the directory file
    pub fn pending_mutations(&self) -> Result<usize> {
        self.with_state(|state| Ok(state.pending))
    }

    /// Close the database
    ///
    /// Commits if anything changed since the last commit, then releases
    /// the index. The handle is closed even if that commit fails.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock().take().ok_or(PrelError::Closed)?;

        if state.pending > 0 {
            state.commit()?;
        }

        info!(path = %self.paths.dir.display(), "closed database");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Paths of the directory, data and backup files
    pub fn paths(&self) -> &DbPaths {
        &self.paths
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Some(mut state) = self.state.get_mut().take() {
            if state.pending > 0 {
                if let Err(e) = state.commit() {
                    warn!(path = %self.paths.dir.display(), error = %e, "commit on drop failed");
                }
            }
        }
    }
}
