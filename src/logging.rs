//! Tracing setup for the CLI and for daemon-side bindings.
//!
//! The CLI logs to stderr, filtered by the `INTRIG_LOG` environment variable
//! so discovery internals can be inspected without touching protocol
//! behavior. Daemon bindings log to a rolling file in their own directory,
//! since they run detached with no terminal.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling client-side log verbosity.
pub const LOG_ENV: &str = "INTRIG_LOG";

/// Initialize stderr logging for the CLI.
///
/// Defaults to warnings only; `INTRIG_LOG=intrig=debug` turns on discovery
/// tracing. Safe to call once per process.
pub fn init_cli() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Initialize file-based logging for a daemon-side binding with daily
/// rotation.
///
/// Writes to `intrig.log` in the given directory, rotated daily. The returned
/// `WorkerGuard` must be kept alive for the duration of the process so the
/// non-blocking writer flushes on shutdown.
pub fn init_daemon(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "intrig.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .init();

    guard
}
