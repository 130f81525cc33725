//! Parallel processing configuration
//!
//! Indicators are evaluated cell by cell on Rayon's global thread pool. This
//! module sizes that pool from the command line.

use crate::errors::{ClimdexError, Result};
use crate::progress::progress;
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    /// `None` keeps Rayon's default (one thread per core)
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            if num_threads == 0 {
                return Err(ClimdexError::ThreadPoolError(
                    "thread count must be at least 1".to_string(),
                ));
            }
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    ClimdexError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {num_threads} threads: {e}"
                    ))
                })?;

            progress!("✅ Configured parallel processing with {num_threads} threads");
        } else {
            progress!(
                "✅ Using default thread pool configuration ({} threads)",
                rayon::current_num_threads()
            );
        }

        Ok(())
    }
}

/// Get information about the current parallel configuration
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        physical_cores: num_cpus::get_physical(),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub physical_cores: usize,
}

impl ParallelInfo {
    /// Print parallel processing information
    pub fn print_info(&self) {
        progress!("📊 Parallel Processing Information:");
        progress!("   Current threads: {}", self.current_threads);
        progress!("   Available CPU cores: {}", self.available_cores);
        progress!("   Physical CPU cores: {}", self.physical_cores);
    }
}
