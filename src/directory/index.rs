//! Directory Index
//!
//! In-memory key → Location mapping, mirrored by the directory file.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::storage::Location;

use super::record;

/// Authoritative key → Location mapping for an open database
///
/// Iteration follows the order in which keys were first inserted.
#[derive(Debug, Default, Clone)]
pub struct Index {
    /// key → location
    map: HashMap<String, Location>,
    /// Keys in first-insertion order
    order: Vec<String>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a directory file
    ///
    /// A missing, unreadable or malformed file yields an empty index.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read directory file, starting empty");
                return Self::new();
            }
        };

        match record::parse(&contents) {
            Ok(records) => {
                let mut index = Self::new();
                for (key, location) in records {
                    index.upsert(key, location);
                }
                debug!(path = %path.display(), entries = index.len(), "loaded directory");
                index
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed directory file, starting empty");
                Self::new()
            }
        }
    }

    /// Location of `key`, if present
    pub fn lookup(&self, key: &str) -> Option<Location> {
        self.map.get(key).copied()
    }

    /// Insert or replace the location of `key`
    ///
    /// Returns the previous location. Replacing keeps the key's original
    /// position in iteration order.
    pub fn upsert(&mut self, key: impl Into<String>, location: Location) -> Option<Location> {
        let key = key.into();
        match self.map.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, location)),
            None => {
                self.order.push(key.clone());
                self.map.insert(key, location);
                None
            }
        }
    }

    /// Drop `key` from the index, returning its last location
    ///
    /// The data-file bytes it pointed at are not reclaimed.
    pub fn remove(&mut self, key: &str) -> Option<Location> {
        let location = self.map.remove(key)?;
        self.order.retain(|k| k != key);
        Some(location)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Keys in first-insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (key, location) pairs in first-insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, Location)> {
        self.order.iter().map(move |k| (k.as_str(), self.map[k]))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
