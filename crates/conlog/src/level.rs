//! Severity levels and threshold checks.

use crate::error::LogError;
use console::{style, StyledObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record, ordered by rank: lower rank is more severe.
///
/// A threshold of rank R lets through every severity with rank <= R, so
/// `Debug` is the most verbose threshold and `None` silences a channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "LevelRepr")]
pub enum Level {
    None,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

/// Levels may be written by name or by numeric rank in config files.
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Rank(i64),
    Name(String),
}

impl TryFrom<LevelRepr> for Level {
    type Error = LogError;

    fn try_from(repr: LevelRepr) -> Result<Self, LogError> {
        match repr {
            LevelRepr::Rank(rank) => Level::from_rank(rank),
            LevelRepr::Name(name) => name.parse(),
        }
    }
}

impl Level {
    pub fn rank(self) -> i64 {
        match self {
            Level::None => -1,
            Level::Error => 0,
            Level::Warn => 1,
            Level::Info => 2,
            Level::Debug => 3,
        }
    }

    pub fn from_rank(rank: i64) -> Result<Self, LogError> {
        match rank {
            -1 => Ok(Level::None),
            0 => Ok(Level::Error),
            1 => Ok(Level::Warn),
            2 => Ok(Level::Info),
            3 => Ok(Level::Debug),
            other => Err(LogError::InvalidLevel(other.to_string())),
        }
    }

    /// Whether a record of `severity` passes this threshold (inclusive).
    pub fn permits(self, severity: Level) -> bool {
        severity != Level::None && severity.rank() <= self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::None => "none",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Fixed-width tag written in front of every record.
    pub fn tag(self) -> &'static str {
        match self {
            Level::None => "",
            Level::Error => "[ERROR]",
            Level::Warn => "[WARN] ",
            Level::Info => "[INFO] ",
            Level::Debug => "[DEBUG]",
        }
    }

    /// The tag colored for terminal output.
    pub fn styled_tag(self) -> StyledObject<&'static str> {
        let tag = style(self.tag());
        match self {
            Level::Debug => tag.black().bright(),
            Level::Info => tag.blue(),
            Level::Warn => tag.yellow(),
            Level::Error => tag.red(),
            Level::None => tag,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(rank) = s.parse::<i64>() {
            return Level::from_rank(rank);
        }
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Level::None),
            "error" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            _ => Err(LogError::InvalidLevel(s.to_string())),
        }
    }
}
