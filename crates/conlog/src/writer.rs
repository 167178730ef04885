use crate::archive::{Archiver, GzipArchiver};
use crate::config::{LogConfig, RotationMode};
use crate::error::Result;
use crate::level::Level;
use crate::sink::{FileSink, Rotation};
use console::style;
use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Produces the call stack attached to error records.
pub type StackTrace = fn() -> String;

/// Default stack capture. Always captures, regardless of `RUST_BACKTRACE`.
pub fn capture_stack() -> String {
    Backtrace::force_capture().to_string()
}

/// Leveled logger writing to the console and, optionally, one file.
///
/// Each record is checked against two thresholds: `print_level` for standard
/// output and `write_level` for the file. The file side goes through a
/// [`FileSink`], which serializes all access to the handle.
pub struct LogWriter {
    config: LogConfig,
    sink: FileSink,
    rotation: Rotation,
    stack: StackTrace,
    console: Option<Mutex<Box<dyn Write + Send>>>,
}

impl fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogWriter")
            .field("config", &self.config)
            .field("sink", &self.sink)
            .field("rotation", &self.rotation)
            .finish_non_exhaustive()
    }
}

impl LogWriter {
    /// Build a writer from `config`, opening the log file if one is configured.
    pub fn new(config: LogConfig) -> Result<Self> {
        let sink = match config.file_path() {
            Some(path) => FileSink::open(path)?,
            None => FileSink::disabled(),
        };
        let rotation = match config.rotation {
            RotationMode::Gzip => Rotation::Archive(Arc::new(GzipArchiver::default())),
            RotationMode::Rename => Rotation::Rename,
        };

        Ok(Self {
            config,
            sink,
            rotation,
            stack: capture_stack,
            console: None,
        })
    }

    /// Console-only writer.
    pub fn memory(level: Level) -> Self {
        Self {
            config: LogConfig::memory(level),
            sink: FileSink::disabled(),
            rotation: Rotation::Archive(Arc::new(GzipArchiver::default())),
            stack: capture_stack,
            console: None,
        }
    }

    /// File-backed writer using `level` for both console and file.
    pub fn open(path: impl Into<PathBuf>, level: Level) -> Result<Self> {
        Self::new(LogConfig::unified(path, level))
    }

    /// Archive rotated files with `archiver` instead of the configured strategy.
    pub fn with_archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.rotation = Rotation::Archive(archiver);
        self
    }

    pub fn with_stack_trace(mut self, stack: StackTrace) -> Self {
        self.stack = stack;
        self
    }

    /// Send console output to `out` instead of standard output.
    pub fn with_console(mut self, out: impl Write + Send + 'static) -> Self {
        self.console = Some(Mutex::new(Box::new(out)));
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.sink.path()
    }

    /// Whether a log file handle is currently held.
    pub fn has_file(&self) -> bool {
        self.sink.is_open()
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, &args.to_string());
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, &args.to_string());
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, &args.to_string());
    }

    /// Error records carry the current call stack on both channels.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        let printing = self.config.print_level.permits(Level::Error);
        let writing = self.config.write_level.permits(Level::Error);
        if !printing && !writing {
            return;
        }

        let message = args.to_string();
        let stack = (self.stack)();
        if printing {
            self.print(format_args!("{} {}\n{}", Level::Error.styled_tag(), message, stack));
        }
        if writing {
            self.sink
                .write_line(&format!("{} {}\n{}", Level::Error.tag(), message, stack));
        }
    }

    /// Log `err` with a description, as `"<description>: <err>"`.
    pub fn error_desc(&self, description: &str, err: &dyn std::error::Error) {
        self.error(format_args!("{}: {}", description, err));
    }

    /// Emit a fatal record on both channels regardless of thresholds, then exit with status 1.
    pub fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        let message = format!("[FATAL] {}", args);
        self.print(format_args!("{}", style(&message).red()));
        self.sink.write_line(&message);
        self.flush();
        std::process::exit(1);
    }

    /// Retire the log file into `dest_dir` and continue in a fresh file.
    ///
    /// Returns the artifact path, or `None` if there was no open file.
    pub fn rotate(&self, dest_dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        Ok(self.sink.rotate(dest_dir.as_ref(), &self.rotation)?)
    }

    /// Open the log file again after `close` or a failure left the writer without one.
    pub fn reopen(&self) -> Result<()> {
        Ok(self.sink.reopen()?)
    }

    pub fn flush(&self) {
        match &self.console {
            Some(out) => {
                let _ = out.lock().unwrap_or_else(PoisonError::into_inner).flush();
            }
            None => {
                let _ = io::stdout().flush();
            }
        }
        self.sink.flush();
    }

    /// Release the log file. Safe to call more than once.
    pub fn close(&self) {
        self.sink.close();
    }

    fn emit(&self, level: Level, message: &str) {
        if self.config.print_level.permits(level) {
            self.print(format_args!("{} {}", level.styled_tag(), message));
        }
        if self.config.write_level.permits(level) {
            self.sink.write_line(&format!("{} {}", level.tag(), message));
        }
    }

    fn print(&self, line: fmt::Arguments<'_>) {
        match &self.console {
            Some(out) => {
                let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(out, "{}", line);
            }
            None => {
                let _ = writeln!(io::stdout().lock(), "{}", line);
            }
        }
    }
}
