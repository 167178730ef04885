use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Config error: {0}")]
    ConfigParsing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
}

impl From<toml::de::Error> for LogError {
    fn from(err: toml::de::Error) -> Self {
        LogError::ConfigParsing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
