//! Diagnostics for the `conlog` binary itself.
//!
//! Records written through `LogWriter` go to stdout and the log file; this
//! subscriber only carries the library's internal tracing events (rotation,
//! reopen, self-healing) to stderr.
//!
//! Level is controlled by the `CONLOG_TRACE` env var (default: `warn`).
//! Examples: `CONLOG_TRACE=debug`, `CONLOG_TRACE=conlog::sink=debug`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking stderr writer alive. Dropping it flushes pending events.
pub struct TraceGuard {
    _guard: WorkerGuard,
}

pub fn init() -> TraceGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let filter = EnvFilter::try_from_env("CONLOG_TRACE")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false);

    // This silently no-ops if a subscriber is already set
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    TraceGuard { _guard: guard }
}
