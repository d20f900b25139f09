use anyhow::{ensure, Context, Result};
use std::fs;
use std::path::Path;

use crate::types::MarkerRecord;

/// Loads the marker records shown on the map. The map view is centered
/// on the first record, so an empty collection is rejected here rather
/// than crashing later.
pub fn load_markers(path: &Path) -> Result<Vec<MarkerRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read markers file {:?}", path))?;
    parse_markers(&content).with_context(|| format!("in markers file {:?}", path))
}

pub fn parse_markers(json: &str) -> Result<Vec<MarkerRecord>> {
    let markers: Vec<MarkerRecord> =
        serde_json::from_str(json).context("markers are not a JSON array of records")?;
    ensure!(!markers.is_empty(), "markers file contains no records");
    Ok(markers)
}
