//! Directory Module
//!
//! The key → Location index and its on-disk form.
//!
//! ## Responsibilities
//! - Authoritative in-memory mapping from key to `Location` (`Index`)
//! - Text encoding of directory records (`record`)
//! - Rewriting the directory file with a one-generation backup (`CommitProtocol`)
//!
//! ## File Format
//! ```text
//! ["bar",[0,3]]
//! ["baz",[512,3]]
//! ["qux",[1024,3]]
//! ```
//! One JSON array per line: `[key, [offset, length]]`, in first-insertion
//! order. Blank lines and surrounding whitespace are ignored on load.

mod commit;
mod index;
pub mod record;

pub use commit::CommitProtocol;
pub use index::Index;
