//! Tests for the Open → Closed lifecycle
//!
//! These tests verify:
//! - Every operation on a closed handle fails with `Closed`
//! - close() commits pending mutations and nothing else
//! - Dropping an open handle commits pending mutations

use std::fs;
use std::sync::Arc;
use std::thread;

use preldb::directory::Index;
use preldb::{CommitPolicy, Config, Database, PrelError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_closed_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open_path(&temp_dir.path().join("foo")).unwrap();
    db.set("bar", "bar").unwrap();
    db.close().unwrap();
    (temp_dir, db)
}

fn assert_closed<T: std::fmt::Debug>(result: preldb::Result<T>) {
    match result {
        Err(e) => assert!(e.is_closed(), "expected Closed, got {:?}", e),
        Ok(v) => panic!("expected Closed, got Ok({:?})", v),
    }
}

// =============================================================================
// Closed Handle Tests
// =============================================================================

#[test]
fn test_every_operation_fails_after_close() {
    let (_temp, db) = setup_closed_db();

    assert!(!db.is_open());
    assert_closed(db.get("bar"));
    assert_closed(db.set("bar", "x"));
    assert_closed(db.delete("bar"));
    assert_closed(db.contains("bar"));
    assert_closed(db.keys());
    assert_closed(db.entries());
    assert_closed(db.location("bar"));
    assert_closed(db.len());
    assert_closed(db.is_empty());
    assert_closed(db.sync());
    assert_closed(db.pending_mutations());
    assert_closed(db.set_commit_policy(CommitPolicy::EveryMutation));
}

#[test]
fn test_second_close_fails() {
    let (_temp, db) = setup_closed_db();

    assert!(matches!(db.close(), Err(PrelError::Closed)));
}

#[test]
fn test_closed_error_message() {
    let (_temp, db) = setup_closed_db();

    let err = db.get("bar").unwrap_err();
    assert_eq!(err.to_string(), "database has been closed");
}

#[test]
fn test_paths_available_after_close() {
    let (_temp, db) = setup_closed_db();

    assert!(db.paths().dir.exists());
    assert!(db.paths().dat.exists());
}

// =============================================================================
// Commit-on-close Tests
// =============================================================================

#[test]
fn test_close_commits_pending_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("foo");
    let config = Config::builder()
        .path(&base)
        .commit_policy(CommitPolicy::EveryNMutations { count: 1000 })
        .build();

    let db = Database::open(config).unwrap();
    db.set("bar", "bar").unwrap();
    assert!(!db.paths().dir.exists());
    db.close().unwrap();

    let reopened = Database::open_path(&base).unwrap();
    assert_eq!(reopened.get("bar").unwrap(), Some(b"bar".to_vec()));
}

#[test]
fn test_close_without_changes_keeps_backup() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("foo");

    let db = Database::open_path(&base).unwrap();
    db.set("a", "1").unwrap();
    db.set("b", "2").unwrap();
    let bak_before = fs::read(&db.paths().bak).unwrap();
    let dir_before = fs::read(&db.paths().dir).unwrap();

    db.close().unwrap();

    assert_eq!(fs::read(&db.paths().bak).unwrap(), bak_before);
    assert_eq!(fs::read(&db.paths().dir).unwrap(), dir_before);
}

#[test]
fn test_drop_commits_pending_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("foo");
    let config = Config::builder()
        .path(&base)
        .commit_policy(CommitPolicy::EveryNMutations { count: 1000 })
        .build();

    {
        let db = Database::open(config).unwrap();
        db.set("bar", "bar").unwrap();
    }

    let dir = temp_dir.path().join("foo.dir");
    assert!(Index::load(&dir).contains("bar"));
}

// =============================================================================
// Shared Handle Tests
// =============================================================================

#[test]
fn test_shared_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("foo"))
        .commit_policy(CommitPolicy::EveryNMutations { count: 50 })
        .build();
    let db = Arc::new(Database::open(config).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..25 {
                    db.set(&format!("t{}-{}", t, i), format!("v{}", i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.len().unwrap(), 100);
    assert_eq!(db.get("t3-24").unwrap(), Some(b"v24".to_vec()));
    db.close().unwrap();
}

#[test]
fn test_independent_instances_coexist() {
    let temp_dir = TempDir::new().unwrap();
    let one = Database::open_path(&temp_dir.path().join("one")).unwrap();
    let two = Database::open_path(&temp_dir.path().join("two")).unwrap();

    one.set("k", "from one").unwrap();
    two.set("k", "from two").unwrap();

    assert_eq!(one.get("k").unwrap(), Some(b"from one".to_vec()));
    assert_eq!(two.get("k").unwrap(), Some(b"from two".to_vec()));

    one.close().unwrap();
    assert_eq!(two.keys().unwrap(), vec!["k".to_string()]);
}
