//! Input folder and output file selection
//!
//! Paths given on the command line are used as-is; anything missing is asked
//! for through a [`PathPrompt`], native dialogs by default. Declining a prompt
//! aborts the run before any data is read.

use crate::errors::{ClimdexError, Result};
use std::path::PathBuf;

/// Message reported when the folder prompt is declined
pub const FOLDER_ABORTED: &str = "Folder selection aborted";
/// Message reported when the output file prompt is declined
pub const SAVE_ABORTED: &str = "Save file selection aborted";

/// Title of the input folder prompt
pub const FOLDER_TITLE: &str = "Select input folder";
/// Title of the output file prompt
pub const SAVE_TITLE: &str = "Select output file";

/// Asks the user for paths
pub trait PathPrompt {
    /// An existing folder, `None` if declined
    fn pick_folder(&self, title: &str) -> Option<PathBuf>;

    /// A file to write, `None` if declined
    fn pick_save_file(&self, title: &str) -> Option<PathBuf>;
}

/// Native folder and save-file dialogs
#[derive(Debug, Clone, Default)]
pub struct DialogPrompt;

impl PathPrompt for DialogPrompt {
    fn pick_folder(&self, title: &str) -> Option<PathBuf> {
        rfd::FileDialog::new().set_title(title).pick_folder()
    }

    fn pick_save_file(&self, title: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .add_filter("NetCDF", &["nc"])
            .save_file()
    }
}

/// Resolved input folder and output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPaths {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
}

/// Resolve the input folder and output file, prompting for what is not given.
///
/// # Errors
///
/// Returns [`ClimdexError::UserAbort`] if a prompt is declined.
pub fn select_paths(
    prompt: &dyn PathPrompt,
    input_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
) -> Result<SelectedPaths> {
    let input_dir = match input_dir {
        Some(dir) => dir,
        None => prompt
            .pick_folder(FOLDER_TITLE)
            .ok_or_else(|| ClimdexError::UserAbort {
                message: FOLDER_ABORTED.to_string(),
            })?,
    };
    let output_path = match output_path {
        Some(path) => path,
        None => prompt
            .pick_save_file(SAVE_TITLE)
            .ok_or_else(|| ClimdexError::UserAbort {
                message: SAVE_ABORTED.to_string(),
            })?,
    };

    tracing::debug!(
        input = %input_dir.display(),
        output = %output_path.display(),
        "paths selected"
    );
    Ok(SelectedPaths {
        input_dir,
        output_path,
    })
}
