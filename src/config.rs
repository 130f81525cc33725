//! Run configuration
//!
//! [`IndicesConfig`] carries the fixed parameters of the indicator set. The
//! defaults reproduce the ETCCDI definitions; the CLI only overrides the file
//! pattern and compression level.

use crate::errors::{ClimdexError, Result};

/// Parameters for one indices run
#[derive(Debug, Clone, PartialEq)]
pub struct IndicesConfig {
    /// Glob pattern selecting input files inside the input folder
    pub pattern: String,
    /// Wet-day threshold in mm/day
    pub wet_day_threshold: f64,
    /// Freezing point used by frost and ice days, in degC
    pub freezing_threshold: f64,
    /// Summer-day threshold for `tx_days_above`, in degC
    pub summer_day_threshold: f64,
    /// Tropical-night threshold, in degC
    pub tropical_night_threshold: f64,
    /// Window of the multi-day precipitation maximum, in days
    pub rx_window: usize,
    /// Minimum spell length counted by the cold spell duration index
    pub csdi_window: usize,
    /// Window of the day-of-year percentile computation, in days
    pub percentile_window: usize,
    /// Lower percentile for the `*10p` thresholds
    pub low_percentile: f64,
    /// Upper percentile for the `*90p` thresholds
    pub high_percentile: f64,
    /// Deflate level applied to every output variable
    pub compression_level: i32,
}

impl Default for IndicesConfig {
    fn default() -> Self {
        Self {
            pattern: "*.nc".to_string(),
            wet_day_threshold: 1.0,
            freezing_threshold: 0.0,
            summer_day_threshold: 25.0,
            tropical_night_threshold: 20.0,
            rx_window: 5,
            csdi_window: 1,
            percentile_window: 5,
            low_percentile: 10.0,
            high_percentile: 90.0,
            compression_level: 4,
        }
    }
}

impl IndicesConfig {
    /// Sets the input file pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Sets the output deflate level.
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the cold spell duration window.
    pub fn with_csdi_window(mut self, window: usize) -> Self {
        self.csdi_window = window;
        self
    }

    /// Sets the multi-day precipitation window.
    pub fn with_rx_window(mut self, window: usize) -> Self {
        self.rx_window = window;
        self
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClimdexError::InvalidCompression`] for a deflate level outside
    /// `0..=9` and [`ClimdexError::Generic`] for zero-length windows or
    /// percentiles outside `0..=100`.
    pub fn validate(&self) -> Result<()> {
        if !(0..=9).contains(&self.compression_level) {
            return Err(ClimdexError::InvalidCompression {
                level: self.compression_level,
            });
        }
        for (name, window) in [
            ("rx_window", self.rx_window),
            ("csdi_window", self.csdi_window),
            ("percentile_window", self.percentile_window),
        ] {
            if window == 0 {
                return Err(ClimdexError::Generic(format!("{name} must be at least 1")));
            }
        }
        for per in [self.low_percentile, self.high_percentile] {
            if !(0.0..=100.0).contains(&per) {
                return Err(ClimdexError::Generic(format!(
                    "percentile {per} is outside 0..=100"
                )));
            }
        }
        if self.pattern.trim().is_empty() {
            return Err(ClimdexError::Generic("file pattern is empty".to_string()));
        }
        Ok(())
    }
}
