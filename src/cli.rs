//! Defines command-line interface options using `clap` for nc-climdex.

use clap::Parser;
use std::path::PathBuf;

/// Annual climate indices from daily NetCDF climate model output
#[derive(Parser, Debug)]
#[command(
    version,
    name = "nc-climdex",
    about = "Compute annual precipitation and temperature indices from daily NetCDF files",
    long_about = "Reads every matching NetCDF file in a folder (pr, tasmax, tasmin on a \
                  time/lat/lon grid), resamples to daily means, computes 20 annual \
                  indicators and writes them to one compressed NetCDF file. Paths not \
                  given on the command line are asked for with file dialogs."
)]
pub struct Args {
    /// Folder containing the input NetCDF files. Prompts when omitted.
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Output NetCDF file. Prompts when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Glob pattern selecting input files inside the input folder
    #[arg(short, long, default_value = "*.nc")]
    pub pattern: String,

    /// Deflate level (0-9) for every output variable
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(i32).range(0..=9))]
    pub compression: i32,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List the computed indicators and exit
    #[arg(long)]
    pub list_indicators: bool,

    /// Print listings and the run summary as JSON
    #[arg(long)]
    pub json: bool,
}
