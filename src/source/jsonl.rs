use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use serde::de::DeserializeOwned;

use crate::error::Error;

/// Reads a JSON-lines file; blank lines are skipped.
///
/// # Returns
/// - `Ok(Vec<T>)` - One value per non-blank line
/// - `Err(Error::IoError)` - The file could not be read
/// - `Err(Error::JsonError)` - A line is not a valid record
pub fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    tracing::debug!("Read {} records from {}", records.len(), path.display());

    Ok(records)
}
