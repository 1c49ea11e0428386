//! Tests for BlockAllocator
//!
//! These tests verify:
//! - New values start on block boundaries
//! - Padding is zero-filled and exactly as long as needed
//! - The allocator only ever appends

use std::fs;
use std::path::PathBuf;

use preldb::storage::{BlockAllocator, Location, BLOCKSIZE};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_data_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.dat");
    fs::write(&path, b"").unwrap();
    (temp_dir, path)
}

// =============================================================================
// Alignment Tests
// =============================================================================

#[test]
fn test_first_allocation_at_zero() {
    let (_temp, path) = setup_data_file();
    let allocator = BlockAllocator::new(&path);

    let location = allocator.append(b"bar").unwrap();

    assert_eq!(location, Location::new(0, 3));
    assert_eq!(fs::read(&path).unwrap(), b"bar");
}

#[test]
fn test_allocations_are_block_aligned() {
    let (_temp, path) = setup_data_file();
    let allocator = BlockAllocator::new(&path);

    let a = allocator.append(b"bar").unwrap();
    let b = allocator.append(b"baz").unwrap();
    let c = allocator.append(&vec![b'X'; 1025]).unwrap();
    let d = allocator.append(b"qux").unwrap();

    assert_eq!(a.offset, 0);
    assert_eq!(b.offset, BLOCKSIZE);
    assert_eq!(c.offset, 2 * BLOCKSIZE);
    // 1025 bytes occupy three blocks
    assert_eq!(d.offset, 5 * BLOCKSIZE);
    assert_eq!(c.length, 1025);
}

#[test]
fn test_padding_is_zero_filled() {
    let (_temp, path) = setup_data_file();
    let allocator = BlockAllocator::new(&path);

    allocator.append(b"abc").unwrap();
    allocator.append(b"def").unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len() as u64, BLOCKSIZE + 3);
    assert_eq!(&bytes[..3], b"abc");
    assert!(bytes[3..BLOCKSIZE as usize].iter().all(|&b| b == 0));
    assert_eq!(&bytes[BLOCKSIZE as usize..], b"def");
}

#[test]
fn test_no_padding_on_exact_boundary() {
    let (_temp, path) = setup_data_file();
    let allocator = BlockAllocator::new(&path);

    allocator.append(&vec![1u8; BLOCKSIZE as usize]).unwrap();
    let next = allocator.append(b"x").unwrap();

    assert_eq!(next.offset, BLOCKSIZE);
    assert_eq!(allocator.end_of_file().unwrap(), BLOCKSIZE + 1);
}

#[test]
fn test_empty_value() {
    let (_temp, path) = setup_data_file();
    let allocator = BlockAllocator::new(&path);

    allocator.append(b"abc").unwrap();
    let empty = allocator.append(b"").unwrap();

    assert_eq!(empty, Location::new(BLOCKSIZE, 0));
    // Padding is still written up to the boundary
    assert_eq!(allocator.end_of_file().unwrap(), BLOCKSIZE);
}

// =============================================================================
// Append-only Tests
// =============================================================================

#[test]
fn test_size_read_fresh_each_call() {
    let (_temp, path) = setup_data_file();
    let allocator = BlockAllocator::new(&path);

    allocator.append(b"abc").unwrap();

    // Someone else grows the file behind the allocator's back
    let mut bytes = fs::read(&path).unwrap();
    bytes.extend(std::iter::repeat(7u8).take(600));
    fs::write(&path, &bytes).unwrap();

    let next = allocator.append(b"z").unwrap();
    assert_eq!(next.offset, 2 * BLOCKSIZE);
    assert_eq!(&fs::read(&path).unwrap()[..3], b"abc");
}

#[test]
fn test_missing_data_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let allocator = BlockAllocator::new(&temp_dir.path().join("missing.dat"));

    assert!(allocator.append(b"abc").is_err());
}
