#![deny(missing_docs)]
//! Shared logging utilities for the jobscout workspace.
//!
//! This crate provides the `agent_*` logging macros used across the codebase,
//! a thread-local active-tab context so host-side log lines can be correlated
//! per tab, and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the tab id the current thread is working on.
    static ACTIVE_TAB: Cell<u64> = const { Cell::new(0) };
}

/// Sets the active tab id for the current thread.
/// The host calls this before dispatching work for a tab.
pub fn set_active_tab(tab_id: u64) {
    ACTIVE_TAB.with(|v| v.set(tab_id));
}

/// Retrieves the active tab id for the current thread.
/// Returns 0 if no tab has been set.
pub fn get_active_tab() -> u64 {
    ACTIVE_TAB.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! agent_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! agent_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! agent_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! agent_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! agent_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
