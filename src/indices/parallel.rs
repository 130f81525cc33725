//! Parallel per-cell evaluation
//!
//! Every indicator is a function of the time series at a single grid cell.
//! This module fans those series out over the rayon pool and gathers the
//! per-cell results back into a gridded array.

use crate::errors::{ClimdexError, Result};
use ndarray::{s, Array3};
use rayon::prelude::*;

/// Apply `f` to the series of every grid cell in parallel.
///
/// `inputs` are `(n, lat, lon)` arrays sharing the same grid; their first axes
/// may differ (a daily series next to a day-of-year threshold table). `f`
/// receives one series per input, in order, and returns `out_len` values
/// which become the first axis of the result.
///
/// # Errors
///
/// Returns an error if no input is given, the inputs do not share a grid, or
/// `f` returns the wrong number of values.
pub fn map_cells<F>(inputs: &[&Array3<f32>], out_len: usize, f: F) -> Result<Array3<f32>>
where
    F: Fn(&[Vec<f32>]) -> Vec<f32> + Sync,
{
    let first = inputs
        .first()
        .ok_or_else(|| ClimdexError::Generic("no input arrays given".to_string()))?;
    let (_, nlat, nlon) = first.dim();
    if let Some(other) = inputs.iter().find(|a| a.dim().1 != nlat || a.dim().2 != nlon) {
        return Err(ClimdexError::Generic(format!(
            "grid mismatch: {nlat} × {nlon} vs {} × {}",
            other.dim().1,
            other.dim().2
        )));
    }

    let output_size = nlat * nlon;
    tracing::trace!(
        cells = output_size,
        threads = rayon::current_num_threads(),
        "evaluating cells"
    );

    let columns: Vec<Vec<f32>> = (0..output_size)
        .into_par_iter()
        .map(|flat_idx| {
            let (i, j) = (flat_idx / nlon, flat_idx % nlon);
            let series: Vec<Vec<f32>> = inputs
                .iter()
                .map(|array| array.slice(s![.., i, j]).to_vec())
                .collect();
            f(&series)
        })
        .collect();

    let mut result = Array3::<f32>::from_elem((out_len, nlat, nlon), f32::NAN);
    for (flat_idx, column) in columns.into_iter().enumerate() {
        if column.len() != out_len {
            return Err(ClimdexError::Generic(format!(
                "cell function returned {} values, expected {out_len}",
                column.len()
            )));
        }
        let (i, j) = (flat_idx / nlon, flat_idx % nlon);
        result.slice_mut(s![.., i, j]).assign(&ndarray::ArrayView1::from(column.as_slice()));
    }

    Ok(result)
}
