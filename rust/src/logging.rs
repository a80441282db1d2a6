//! Verbosity-gated logging for the roster engine.
//!
//! Nothing is formatted unless the configured level asks for it.
//! - 0: silent
//! - 1: changes (assignments, unassigned duties, reassignments)
//! - 2: checks (why a candidate was rejected)
//! - 3: debug (score breakdowns)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log a state change: a duty was assigned, left unassigned or moved.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!("[roster] {}", format_args!($($arg)*));
        }
    };
}

/// Log a hard-constraint rejection for a candidate.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!("[roster]   {}", format_args!($($arg)*));
        }
    };
}

/// Log scoring internals.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[roster]     {}", format_args!($($arg)*));
        }
    };
}
