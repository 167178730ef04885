//! Compressed artifacts produced by rotation.

use flate2::{Compression, GzBuilder};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Entry name stored inside every rotation archive.
pub const ARCHIVE_ENTRY: &str = "console.log";

/// Writes one named entry into a new compressed file.
pub trait Archiver: Send + Sync {
    /// File extension appended to the artifact name, without the dot.
    fn extension(&self) -> &str;

    /// Create `dest` holding `contents` under `entry_name`, replacing any existing file.
    fn create(&self, dest: &Path, entry_name: &str, contents: &[u8]) -> io::Result<()>;
}

/// Gzip archiver. The entry name goes into the gzip header's file name field.
///
/// Gzip holds a single stream, so `console.log` is only the optional FNAME
/// header field, not a separate archive member. Tools that ignore the header
/// name the decompressed file after the artifact instead.
#[derive(Debug, Clone, Copy)]
pub struct GzipArchiver {
    level: Compression,
}

impl GzipArchiver {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for GzipArchiver {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Archiver for GzipArchiver {
    fn extension(&self) -> &str {
        "gz"
    }

    fn create(&self, dest: &Path, entry_name: &str, contents: &[u8]) -> io::Result<()> {
        let file = File::create(dest)?;
        let mut encoder = GzBuilder::new()
            .filename(entry_name.as_bytes())
            .write(file, self.level);
        encoder.write_all(contents)?;
        let file = encoder.finish()?;
        file.sync_all()
    }
}
