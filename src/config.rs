//! Configuration for PrelDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{PrelError, Result};

/// Default permission bits for the directory and data files
pub const DEFAULT_MODE: u32 = 0o666;

/// Main configuration for a PrelDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Base path; the database files are derived from it:
    ///   {path}.dir   (directory file)
    ///   {path}.dat   (data file)
    ///   {path}.bak   (previous directory generation)
    pub path: PathBuf,

    /// What to do with existing files on open
    pub flag: OpenFlag,

    /// Permission bits applied to the directory and data files (unix only)
    pub mode: u32,

    // -------------------------------------------------------------------------
    // Commit Configuration
    // -------------------------------------------------------------------------
    /// When mutations are written back to the directory file
    pub commit_policy: CommitPolicy,
}

/// How to treat existing database files on open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenFlag {
    /// Open existing files, creating them if missing ('c')
    #[default]
    Create,

    /// Remove any existing files and start empty ('n')
    Reset,
}

impl OpenFlag {
    /// Parse the classic dbm single-letter flag
    pub fn from_char(flag: char) -> Result<Self> {
        match flag {
            'c' => Ok(OpenFlag::Create),
            'n' => Ok(OpenFlag::Reset),
            other => Err(PrelError::Config(format!(
                "unknown open flag '{}', expected 'c' or 'n'",
                other
            ))),
        }
    }
}

/// Auto-commit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Commit after every set/delete (safest, slowest)
    #[default]
    EveryMutation,

    /// Commit once every `count` set/delete calls
    EveryNMutations { count: usize },
}

impl CommitPolicy {
    /// Number of mutations between commits
    pub fn threshold(&self) -> usize {
        match self {
            CommitPolicy::EveryMutation => 1,
            CommitPolicy::EveryNMutations { count } => *count,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.threshold() == 0 {
            return Err(PrelError::Config(
                "commit policy needs a threshold of at least 1 mutation".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./preldb"),
            flag: OpenFlag::default(),
            mode: DEFAULT_MODE,
            commit_policy: CommitPolicy::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base path for the database files
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the open flag
    pub fn flag(mut self, flag: OpenFlag) -> Self {
        self.config.flag = flag;
        self
    }

    /// Set the file permission bits
    pub fn mode(mut self, mode: u32) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the auto-commit policy
    pub fn commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.config.commit_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
