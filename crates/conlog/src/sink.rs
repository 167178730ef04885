//! The log file handle and everything that touches it.
//!
//! `FileSink` owns the only handle to the log file. The handle lives in a
//! `Mutex<Option<File>>`: `Some` is an open, writable file and `None` means
//! file logging is disabled, the sink was closed, or a reopen failed. Every
//! read or replacement of the handle happens with the lock held, so a writer
//! sees the old file, no file, or the new file, never a closed one.

use crate::archive::{Archiver, ARCHIVE_ENTRY};
use chrono::{Local, NaiveDate, SecondsFormat};
use console::style;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How a rotation turns the active file into its dated artifact.
#[derive(Clone)]
pub enum Rotation {
    /// Rename the file to `log.<date>`.
    Rename,
    /// Copy the contents into `log.<date>.<ext>` through an archiver, then remove the file.
    Archive(Arc<dyn Archiver>),
}

impl std::fmt::Debug for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rotation::Rename => f.write_str("Rename"),
            Rotation::Archive(archiver) => write!(f, "Archive(.{})", archiver.extension()),
        }
    }
}

#[derive(Debug)]
pub struct FileSink {
    path: Option<PathBuf>,
    file: Mutex<Option<File>>,
}

/// Open `path` for appending, creating it readable and writable by the owner only.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Current local time as RFC 3339 with second precision.
pub fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Name of the artifact a rotation on `date` produces, e.g. `log.2024-03-01.gz`.
pub fn artifact_name(date: NaiveDate, extension: Option<&str>) -> String {
    let base = format!("log.{}", date.format("%Y-%m-%d"));
    match extension {
        Some(ext) => format!("{}.{}", base, ext),
        None => base,
    }
}

/// Stderr diagnostic for a log file that could not be reopened. Output errors are ignored.
fn report_unavailable(out: &mut impl Write, path: &Path, err: &io::Error) {
    let _ = writeln!(
        out,
        "{} {}: {}",
        style("Error writing to log").red(),
        path.display(),
        err
    );
}

/// True when `path` no longer names the file behind `file` (deleted or replaced).
#[cfg(unix)]
fn is_detached(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(path), file.metadata()) {
        (Ok(on_disk), Ok(held)) => on_disk.dev() != held.dev() || on_disk.ino() != held.ino(),
        _ => true,
    }
}

#[cfg(not(unix))]
fn is_detached(_file: &File, path: &Path) -> bool {
    !path.exists()
}

impl FileSink {
    /// A sink that never writes. Used for console-only loggers.
    pub fn disabled() -> Self {
        Self {
            path: None,
            file: Mutex::new(None),
        }
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        let file = open_log_file(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    // The guarded Option<File> is valid whatever a panicking holder was doing.
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `<timestamp> <line>` to the file.
    ///
    /// Never fails. If the write fails, or the file was removed or replaced
    /// underneath us, the line is dropped and the path is reopened for the
    /// next call. If reopening fails too, the sink goes quiet until
    /// [`FileSink::reopen`] succeeds.
    pub fn write_line(&self, line: &str) {
        let Some(path) = self.path.as_deref() else {
            return;
        };

        let mut guard = self.lock();
        let Some(file) = guard.as_mut() else {
            return;
        };

        let result = if is_detached(file, path) {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                "log file was removed or replaced",
            ))
        } else {
            let record = format!("{} {}\n", timestamp(), line);
            file.write_all(record.as_bytes())
        };

        if let Err(err) = result {
            *guard = None;
            match open_log_file(path) {
                Ok(file) => {
                    tracing::warn!(path = %path.display(), error = %err, "log write failed, reopened file");
                    *guard = Some(file);
                }
                Err(reopen_err) => {
                    tracing::warn!(path = %path.display(), error = %reopen_err, "log file unavailable");
                    report_unavailable(&mut io::stderr(), path, &reopen_err);
                }
            }
        }
    }

    /// Retire the active file into `dest_dir` and start a fresh one at the same path.
    ///
    /// Returns the artifact path, or `None` when there was no open file to rotate.
    /// The lock is held throughout. On error the sink is left without a file.
    pub fn rotate(&self, dest_dir: &Path, rotation: &Rotation) -> io::Result<Option<PathBuf>> {
        let Some(path) = self.path.as_deref() else {
            return Ok(None);
        };

        let mut guard = self.lock();
        let Some(mut file) = guard.take() else {
            return Ok(None);
        };

        let extension = match rotation {
            Rotation::Rename => None,
            Rotation::Archive(archiver) => Some(archiver.extension()),
        };
        let dest = dest_dir.join(artifact_name(Local::now().date_naive(), extension));
        tracing::debug!(from = %path.display(), to = %dest.display(), "rotating log file");

        file.flush()?;
        drop(file);

        fs::create_dir_all(dest_dir)?;
        match rotation {
            Rotation::Rename => fs::rename(path, &dest)?,
            Rotation::Archive(archiver) => {
                let contents = fs::read(path)?;
                archiver.create(&dest, ARCHIVE_ENTRY, &contents)?;
                fs::remove_file(path)?;
            }
        }

        *guard = Some(open_log_file(path)?);
        Ok(Some(dest))
    }

    /// Open the configured path again, replacing any current handle.
    pub fn reopen(&self) -> io::Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let mut guard = self.lock();
        *guard = None;
        *guard = Some(open_log_file(path)?);
        tracing::debug!(path = %path.display(), "log file reopened");
        Ok(())
    }

    /// Push written data to disk. Best effort.
    pub fn flush(&self) {
        if let Some(file) = self.lock().as_mut() {
            let _ = file.flush();
            let _ = file.sync_data();
        }
    }

    /// Release the handle. Later writes are no-ops until `reopen`.
    pub fn close(&self) {
        if let Some(mut file) = self.lock().take() {
            let _ = file.flush();
        }
    }
}
