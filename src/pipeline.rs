//! End-to-end indices generation
//!
//! discover → load → resample → evaluate → encode → write, stopping at the
//! first error. The output file only appears once everything succeeded.

use crate::config::IndicesConfig;
use crate::encoding::compute_encodings;
use crate::errors::Result;
use crate::indices::Evaluator;
use crate::loader::{discover_files, load_dataset};
use crate::metadata::print_dataset_summary;
use crate::netcdf_io::NetCDFWriter;
use crate::progress::progress;
use crate::prompt::{select_paths, PathPrompt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub input_files: Vec<PathBuf>,
    /// Indicator variables written, in file order
    pub indicators: Vec<String>,
    pub first_year: i32,
    pub last_year: i32,
    pub nlat: usize,
    pub nlon: usize,
}

impl RunSummary {
    /// Print a human-readable report
    pub fn print(&self) {
        println!("✅ Wrote {} indicators to {}", self.indicators.len(), self.output.display());
        println!("   Years: {}-{}", self.first_year, self.last_year);
        println!("   Grid: {} × {}", self.nlat, self.nlon);
        println!("   Input files: {}", self.input_files.len());
    }
}

/// Compute every indicator for the files in `input_dir` and write them to
/// `output_path`.
pub fn generate_indices(
    input_dir: &Path,
    output_path: &Path,
    config: &IndicesConfig,
) -> Result<RunSummary> {
    config.validate()?;
    let started = Instant::now();

    let files = discover_files(input_dir, &config.pattern)?;
    let dataset = load_dataset(&files)?;
    let daily = dataset.resample_daily_mean()?;
    drop(dataset);
    if tracing::enabled!(tracing::Level::INFO) {
        print_dataset_summary(&daily);
    }

    let output = Evaluator::new(&daily, config)?.evaluate_all()?;
    let encodings = compute_encodings(&output, config.compression_level)?;

    progress!("🚀 Writing {}", output_path.display());
    NetCDFWriter::new(output_path).write_dataset(&output, &encodings)?;

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        indicators = output.variables.len(),
        "indices generated"
    );

    let (_, nlat, nlon) = output.shape();
    Ok(RunSummary {
        output: output_path.to_path_buf(),
        input_files: files,
        indicators: output.names().into_iter().map(str::to_string).collect(),
        first_year: output.years.first().copied().unwrap_or_default(),
        last_year: output.years.last().copied().unwrap_or_default(),
        nlat,
        nlon,
    })
}

/// Resolve the paths (prompting where not given) and generate the indices.
pub fn run(
    prompt: &dyn PathPrompt,
    input_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    config: &IndicesConfig,
) -> Result<RunSummary> {
    let paths = select_paths(prompt, input_dir, output_path)?;
    generate_indices(&paths.input_dir, &paths.output_path, config)
}
