//! Directory record encoding
//!
//! Each record is a single line `["key",[offset,length]]`.

use crate::error::Result;
use crate::storage::Location;

/// Encode one directory entry as a line (without the trailing newline)
pub fn encode(key: &str, location: Location) -> Result<String> {
    Ok(serde_json::to_string(&(key, [location.offset, location.length]))?)
}

/// Decode one directory line
pub fn decode(line: &str) -> Result<(String, Location)> {
    let (key, [offset, length]): (String, [u64; 2]) = serde_json::from_str(line.trim())?;
    Ok((key, Location::new(offset, length)))
}

/// Decode a whole directory file, skipping blank lines
///
/// Fails on the first malformed line.
pub fn parse(contents: &str) -> Result<Vec<(String, Location)>> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(decode)
        .collect()
}
