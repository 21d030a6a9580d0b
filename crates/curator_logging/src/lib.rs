#![deny(missing_docs)]
//! Logging facade shared by the curator crates.
//!
//! All `curator_*` macros log under the [`TARGET`] target so the shell can
//! filter control-panel output from dependency noise. The dispatch sequence
//! is a per-thread counter the shell advances once per reducer step; it is
//! prefixed to every line so a poll result can be traced to the message that
//! consumed it.

use std::cell::Cell;

/// Log target used by every `curator_*` macro.
pub const TARGET: &str = "curator";

thread_local! {
    static DISPATCH_SEQ: Cell<u64> = const { Cell::new(0) };
}

/// Records the sequence number of the message currently being dispatched on
/// this thread.
pub fn set_dispatch_seq(seq: u64) {
    DISPATCH_SEQ.with(|v| v.set(seq));
}

/// Returns the sequence number set by [`set_dispatch_seq`], or 0 on threads
/// that never dispatch messages (engine workers).
pub fn dispatch_seq() -> u64 {
    DISPATCH_SEQ.with(|v| v.get())
}

/// Logs a trace-level message under the curator target.
#[macro_export]
macro_rules! curator_trace {
    ($($arg:tt)*) => {{
        log::trace!(
            target: $crate::TARGET,
            "[{}] {}",
            $crate::dispatch_seq(),
            format_args!($($arg)*)
        );
    }};
}

/// Logs a debug-level message under the curator target.
#[macro_export]
macro_rules! curator_debug {
    ($($arg:tt)*) => {{
        log::debug!(
            target: $crate::TARGET,
            "[{}] {}",
            $crate::dispatch_seq(),
            format_args!($($arg)*)
        );
    }};
}

/// Logs an info-level message under the curator target.
#[macro_export]
macro_rules! curator_info {
    ($($arg:tt)*) => {{
        log::info!(
            target: $crate::TARGET,
            "[{}] {}",
            $crate::dispatch_seq(),
            format_args!($($arg)*)
        );
    }};
}

/// Logs a warn-level message under the curator target.
#[macro_export]
macro_rules! curator_warn {
    ($($arg:tt)*) => {{
        log::warn!(
            target: $crate::TARGET,
            "[{}] {}",
            $crate::dispatch_seq(),
            format_args!($($arg)*)
        );
    }};
}

/// Logs an error-level message under the curator target.
#[macro_export]
macro_rules! curator_error {
    ($($arg:tt)*) => {{
        log::error!(
            target: $crate::TARGET,
            "[{}] {}",
            $crate::dispatch_seq(),
            format_args!($($arg)*)
        );
    }};
}

/// Installs a terminal logger for tests.
///
/// Safe to call from every test: a second call finds the global logger
/// already set and returns without touching it.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let config = ConfigBuilder::new()
        .add_filter_allow_str(TARGET)
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Never);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_seq_is_per_thread() {
        set_dispatch_seq(41);
        assert_eq!(dispatch_seq(), 41);
        let other = std::thread::spawn(dispatch_seq).join().unwrap();
        assert_eq!(other, 0);
    }

    #[test]
    fn macros_expand_without_logger() {
        initialize_for_tests();
        curator_info!("poll started kind={}", "scan");
        curator_warn!("failures={}", 3);
    }
}
