//! Annual climate indicators
//!
//! This module is organized into submodules:
//! - `operations`: the indicator set, names and CF metadata
//! - `evaluate`: evaluation of every indicator over a daily [`Dataset`](crate::dataset::Dataset)
//! - `annual`: yearly grouping and the missing-value policy
//! - `percentile`: day-of-year percentile thresholds
//! - `run_length`: spell and rolling-window helpers
//! - `parallel`: per-cell fan-out over the rayon pool

pub mod annual;
pub mod evaluate;
pub mod operations;
pub mod parallel;
pub mod percentile;
pub mod run_length;

pub use annual::{TimeAxis, YearSpan};
pub use evaluate::{Evaluator, Thresholds};
pub use operations::{catalog, Indicator, IndicatorMetadata};
pub use percentile::percentile_doy;
