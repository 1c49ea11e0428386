//! Error types for PrelDB
//!
//! Provides a unified error type for all operations.
//!
//! A missing key is not an error: lookups return `Option` and deletes
//! return `bool`.

use thiserror::Error;

/// Result type alias using PrelError
pub type Result<T> = std::result::Result<T, PrelError>;

/// Unified error type for PrelDB operations
#[derive(Debug, Error)]
pub enum PrelError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("database has been closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PrelError {
    /// True if this error came from using a closed handle
    pub fn is_closed(&self) -> bool {
        matches!(self, PrelError::Closed)
    }
}

impl From<serde_json::Error> for PrelError {
    fn from(e: serde_json::Error) -> Self {
        PrelError::Serialization(e.to_string())
    }
}
