//! # conlog
//!
//! Leveled logging to the console and an optional log file, with dated,
//! compressed rotation of that file.
//!
//! ```no_run
//! use conlog::{Level, LogConfig, LogWriter};
//!
//! let log = LogWriter::new(LogConfig::split("app.log", Level::Info, Level::Warn))?;
//! conlog::info!(log, "started");
//! conlog::warn!(log, "low disk: {}%", 93);
//! log.rotate("archive")?;
//! # Ok::<(), conlog::LogError>(())
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod level;
mod macros;
pub mod sink;
pub mod writer;

pub use archive::{Archiver, GzipArchiver, ARCHIVE_ENTRY};
pub use config::{conlog_home, LogConfig, RotationMode};
pub use error::{LogError, Result};
pub use level::Level;
pub use sink::{FileSink, Rotation};
pub use writer::{capture_stack, LogWriter, StackTrace};
