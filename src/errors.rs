//! Centralized error handling for nc_climdex
//!
//! Every fallible operation in the crate returns [`Result`], so a failure at any
//! stage of the pipeline propagates unchanged to the binary, which reports it
//! and exits without writing output.

use std::path::PathBuf;

/// Main error type for nc_climdex operations
#[derive(Debug, thiserror::Error)]
pub enum ClimdexError {
    /// The user cancelled a folder or file prompt
    #[error("{message}")]
    UserAbort { message: String },

    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),

    /// Malformed glob pattern for input discovery
    #[error("Invalid file pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    /// A directory entry could not be read during input discovery
    #[error("Failed to read input entry: {0}")]
    GlobError(#[from] glob::GlobError),

    /// No file matched the input pattern
    #[error("No input files match '{pattern}' in {}", dir.display())]
    NoInputFiles { dir: PathBuf, pattern: String },

    /// Variable not found in a NetCDF file
    #[error("Variable '{var}' not found in {}", path.display())]
    VariableNotFound { var: String, path: PathBuf },

    /// A variable does not have the expected dimensions
    #[error("Variable '{var}' in {} has dimensions [{found}], expected [{expected}]", path.display())]
    DimensionMismatch {
        var: String,
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Input files disagree on grid, variables or time axis
    #[error("Inconsistent input files: {message}")]
    InconsistentInputs { message: String },

    /// Time coordinate cannot be decoded
    #[error("Invalid time coordinate: {reason}")]
    InvalidTime { reason: String },

    /// Calendar attribute names a calendar that is not supported
    #[error("Unsupported calendar '{calendar}'")]
    UnsupportedCalendar { calendar: String },

    /// Units attribute cannot be converted to the canonical units
    #[error("Unsupported units '{units}' for variable '{var}'")]
    UnsupportedUnits { var: String, units: String },

    /// Compression level outside the deflate range
    #[error("Invalid compression level {level} (must be 0..=9)")]
    InvalidCompression { level: i32 },

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

impl From<String> for ClimdexError {
    fn from(error: String) -> Self {
        ClimdexError::Generic(error)
    }
}

impl From<&str> for ClimdexError {
    fn from(error: &str) -> Self {
        ClimdexError::Generic(error.to_string())
    }
}

/// Result type alias for nc_climdex operations
pub type Result<T> = std::result::Result<T, ClimdexError>;
