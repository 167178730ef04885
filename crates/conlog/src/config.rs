use crate::error::{LogError, Result};
use crate::level::Level;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides both thresholds.
pub const LEVEL_ENV: &str = "CONLOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// File to append records to. `None` (or an empty path) keeps logging on the console only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub write_level: Level,
    #[serde(default)]
    pub print_level: Level,
    #[serde(default)]
    pub rotation: RotationMode,
}

/// How `rotate` retires the active file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// Compress the contents into `log.<date>.gz` and remove the original.
    #[default]
    Gzip,
    /// Rename the file to `log.<date>`.
    Rename,
}

/// Returns the conlog home directory (~/.conlog/ by default, respects CONLOG_HOME env var).
pub fn conlog_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("CONLOG_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| LogError::Config("Could not find home directory".to_string()))?;
    Ok(home.join(".conlog"))
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::memory(Level::default())
    }
}

impl LogConfig {
    /// Console-only configuration with one level for both channels.
    pub fn memory(level: Level) -> Self {
        Self {
            path: None,
            write_level: level,
            print_level: level,
            rotation: RotationMode::default(),
        }
    }

    /// File-backed configuration with one level for both channels.
    pub fn unified(path: impl Into<PathBuf>, level: Level) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::memory(level)
        }
    }

    /// File-backed configuration with separate file and console thresholds.
    pub fn split(path: impl Into<PathBuf>, write_level: Level, print_level: Level) -> Self {
        Self {
            path: Some(path.into()),
            write_level,
            print_level,
            rotation: RotationMode::default(),
        }
    }

    pub fn with_rotation(mut self, rotation: RotationMode) -> Self {
        self.rotation = rotation;
        self
    }

    /// The configured file path, treating an empty path as no file.
    pub fn file_path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LogError::Config(format!(
                "Config file not found at {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: LogConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `~/.conlog/config.toml`, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LogError::Config(e.to_string()))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(conlog_home()?.join("config.toml"))
    }

    /// Override both thresholds from `CONLOG_LEVEL` when it is set.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(LEVEL_ENV) {
            let level: Level = value.parse()?;
            self.write_level = level;
            self.print_level = level;
        }
        Ok(())
    }
}
