//! Console progress lines
//!
//! Loading, evaluation and writing report their steps as short emoji-prefixed
//! lines. They go to stdout unless redirected to stderr, which keeps stdout
//! free for machine-readable output such as `--json`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static TO_STDERR: AtomicBool = AtomicBool::new(false);

/// Send progress lines to stderr (`true`) or stdout (`false`).
pub fn redirect_to_stderr(enabled: bool) {
    TO_STDERR.store(enabled, Ordering::Relaxed);
}

/// Whether progress lines currently go to stderr
pub fn is_redirected() -> bool {
    TO_STDERR.load(Ordering::Relaxed)
}

/// Print one progress line to the current sink.
pub fn emit(line: fmt::Arguments<'_>) {
    if is_redirected() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// `println!`-style progress output
macro_rules! progress {
    ($($arg:tt)*) => {
        $crate::progress::emit(format_args!($($arg)*))
    };
}

pub(crate) use progress;
