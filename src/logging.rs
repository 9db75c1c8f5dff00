/// Logging utilities with verbose mode support
///
/// Set TEMPBOX_VERBOSE=1 or use --verbose to enable verbose logging

use std::sync::atomic::{AtomicBool, Ordering};

/// Global verbose flag
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable verbose logging
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

/// Check if verbose logging is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Pick up the verbose flag from the environment
pub fn init_from_env() {
    if let Ok(value) = std::env::var("TEMPBOX_VERBOSE") {
        set_verbose(value == "1" || value.eq_ignore_ascii_case("true"));
    }
}

/// Log a message only in verbose mode
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            println!($($arg)*);
        }
    };
}

/// Log an error/warning message (always shown)
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

/// Log an important info message (always shown)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        println!($($arg)*);
    };
}
