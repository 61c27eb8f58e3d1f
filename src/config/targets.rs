//! Target feature lists
//!
//! Indices come either from `--indices 1,2,3` or from a CSV file whose first
//! column holds the index, with a header row.

use crate::domain::{FeatureIndex, GeeError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Reads the target index list from a CSV file
///
/// # Errors
///
/// Returns [`GeeError::Io`] if the file cannot be read and
/// [`GeeError::Validation`] if a row holds no valid index or the list is empty.
pub fn load_target_file(path: impl AsRef<Path>) -> Result<Vec<FeatureIndex>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| GeeError::Io(format!("Failed to read target file {}: {e}", path.display())))?;
    parse_target_csv(&contents)
}

/// Parses CSV text into a target index list
///
/// The first line is a header and is skipped. Blank lines are ignored.
pub fn parse_target_csv(contents: &str) -> Result<Vec<FeatureIndex>> {
    let mut indices = Vec::new();

    for (line_no, line) in contents.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let first = line.split(',').next().unwrap_or_default();
        let cell = first.trim().trim_matches('"');
        let index = FeatureIndex::from_str(cell)
            .map_err(|e| GeeError::Validation(format!("target file line {}: {e}", line_no + 1)))?;
        indices.push(index);
    }

    finish(indices)
}

/// Parses a comma-separated index list such as `12,15,102`
pub fn parse_index_list(raw: &str) -> Result<Vec<FeatureIndex>> {
    let indices = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| FeatureIndex::from_str(part).map_err(GeeError::Validation))
        .collect::<Result<Vec<_>>>()?;

    finish(indices)
}

/// Drops repeated indices, keeping first-seen order
fn finish(indices: Vec<FeatureIndex>) -> Result<Vec<FeatureIndex>> {
    let mut seen = HashSet::with_capacity(indices.len());
    let total = indices.len();
    let unique: Vec<FeatureIndex> = indices.into_iter().filter(|i| seen.insert(*i)).collect();

    if unique.len() < total {
        tracing::warn!(
            duplicates = total - unique.len(),
            "Ignoring repeated feature indices in target list"
        );
    }

    if unique.is_empty() {
        return Err(GeeError::Validation(
            "target list contains no feature indices".to_string(),
        ));
    }

    Ok(unique)
}
