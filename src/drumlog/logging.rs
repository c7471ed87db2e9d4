//! Diagnostic logging for the binary.
//!
//! The library only emits `tracing` events. The CLI installs a subscriber
//! writing to stderr so command output on stdout stays clean. `DRUMLOG_LOG`
//! takes an `EnvFilter` directive (`debug`, `drumlog=trace`, ...) and wins over
//! the `-v` count.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DRUMLOG_LOG";

/// Filter directive for a `-v` count.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
