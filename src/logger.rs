// This file implements the installer's logging system.
// It provides macros for the different log levels (INFO, WARN, ERROR, DEBUG)
// and gates debug output behind the `--verbose` flag, with colored terminal output.
// Everything goes to stderr so stdout stays free for the summary table and `--help`.

use colored::Colorize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

// `log_info!` for step progress.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_green("[INFO]"), format!($($arg)*)));
}

// `log_warn!` for conditions the run tolerates (unknown OS version, PyPI unreachable).
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_yellow("[WARN]"), format!($($arg)*)));
}

// `log_error!` for the failure that ends the run.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_red("[ERROR]"), format!($($arg)*)));
}

// `log_debug!` for command lines, resolved paths and other detail.
// Only printed once `--verbose` switched debug mode on.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
           eprintln!("{} {}", ::colored::Colorize::dimmed("[DEBUG]"), format!($($arg)*));
        }
    };
}

// Global flag to control debug logging, ensured to be initialized once.
static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Initializes the logger.
/// Called once from `main` right after the flags are parsed.
///
/// # Arguments
/// * `verbose`: If `true`, debug messages are printed as well.
/// * `no_color`: If `true`, all ANSI coloring is suppressed (`--no-color`).
pub fn init(verbose: bool, no_color: bool) {
    if no_color {
        colored::control::set_override(false);
    }

    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(verbose))
        .store(verbose, Ordering::Relaxed);

    if verbose {
        crate::log_debug!("Logger initialized in {} mode", "DEBUG".bold());
    }
}

/// Checks if debug logging is currently enabled.
/// Used by the `log_debug!` macro.
///
/// # Returns
/// * `true` if debug logging is enabled, `false` otherwise (including when `init` was never called).
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get()
        .map(|f| f.load(Ordering::Relaxed))
        .unwrap_or(false)
}
