//! Leveled logging macros over [`LogWriter`](crate::LogWriter).
//!
//! Each takes the writer first, then a format string and arguments:
//! `info!(log, "listening on {}", addr)`.

#[macro_export]
macro_rules! debug {
    ($log:expr, $($arg:tt)*) => {
        $log.debug(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! info {
    ($log:expr, $($arg:tt)*) => {
        $log.info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($log:expr, $($arg:tt)*) => {
        $log.warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($log:expr, $($arg:tt)*) => {
        $log.error(format_args!($($arg)*))
    };
}

/// Logs at fatal level and exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($log:expr, $($arg:tt)*) => {
        $log.fatal(format_args!($($arg)*))
    };
}
