//! nc_climdex: annual climate indices from gridded daily NetCDF data
//!
//! Reads a folder of NetCDF files holding daily (or sub-daily) precipitation
//! and minimum/maximum temperature on a `time × lat × lon` grid, resamples
//! them to daily means and computes 20 annual precipitation and temperature
//! extreme indicators, written to a single compressed NetCDF file.
//!
//! ## Module Organization
//!
//! - [`prompt`]: input folder and output file selection
//! - [`loader`]: multi-file discovery, reading and concatenation
//! - [`dataset`]: the in-memory daily dataset and its resampling
//! - [`calendar`] and [`units`]: CF time decoding and unit normalisation
//! - [`indices`]: indicator definitions and their parallel evaluation
//! - [`output`], [`encoding`] and [`netcdf_io`]: the annual result and its
//!   NetCDF serialization
//! - [`pipeline`]: the end-to-end run
//! - [`metadata`] and [`progress`]: console summaries and progress lines
//! - [`parallel`]: thread pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//! ```rust,no_run
//! use nc_climdex::prelude::*;
//! use std::path::Path;
//!
//! let config = IndicesConfig::default();
//! let summary = generate_indices(Path::new("data/"), Path::new("indices.nc"), &config).unwrap();
//! println!("wrote {:?}", summary.indicators);
//! ```

pub mod calendar;
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod errors;
pub mod indices;
pub mod loader;
pub mod metadata;
pub mod netcdf_io;
pub mod output;
pub mod parallel;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod units;

pub use config::IndicesConfig;
pub use errors::{ClimdexError, Result};
pub use pipeline::{generate_indices, RunSummary};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::IndicesConfig;
    pub use crate::dataset::Dataset;
    pub use crate::errors::{ClimdexError, Result};
    pub use crate::indices::{Evaluator, Indicator};
    pub use crate::loader::{discover_files, load_dataset};
    pub use crate::netcdf_io::NetCDFWriter;
    pub use crate::output::OutputDataset;
    pub use crate::parallel::ParallelConfig;
    pub use crate::pipeline::{generate_indices, RunSummary};
    pub use crate::prompt::{select_paths, DialogPrompt, PathPrompt};
}
