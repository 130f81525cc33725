//! Per-variable storage settings for the output file

use crate::errors::{ClimdexError, Result};
use crate::output::OutputDataset;
use std::collections::BTreeMap;

/// Storage settings of one data variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEncoding {
    /// Deflate level, `0` disables compression
    pub deflate_level: i32,
    pub shuffle: bool,
    /// Chunk shape along `(time, lat, lon)`
    pub chunks: Vec<usize>,
}

/// Encodings keyed by variable name
pub type Encodings = BTreeMap<String, VariableEncoding>;

/// Compression and chunking for every data variable of `output`.
///
/// Each variable gets deflate level `comp_level` with shuffle, chunked one
/// year at a time. Coordinates are left uncompressed.
///
/// # Errors
///
/// Returns [`ClimdexError::InvalidCompression`] if `comp_level` is outside
/// `0..=9`.
pub fn compute_encodings(output: &OutputDataset, comp_level: i32) -> Result<Encodings> {
    if !(0..=9).contains(&comp_level) {
        return Err(ClimdexError::InvalidCompression { level: comp_level });
    }
    let (_, nlat, nlon) = output.shape();
    // zero-length chunks are invalid
    let chunks = vec![1, nlat.max(1), nlon.max(1)];

    Ok(output
        .variables
        .iter()
        .map(|variable| {
            (
                variable.name.clone(),
                VariableEncoding {
                    deflate_level: comp_level,
                    shuffle: true,
                    chunks: chunks.clone(),
                },
            )
        })
        .collect())
}
