//! # conlog
//!
//! Command-line front end for the conlog library: write leveled records to
//! the console and the configured log file, and rotate that file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conlog::{Level, LogConfig, LogWriter, RotationMode};
use console::style;
use std::path::PathBuf;

mod logging;

#[derive(Parser)]
#[command(name = "conlog")]
#[command(about = "Leveled console and file logging with dated rotation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Config file (default: ~/.conlog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file to append to, overriding the config
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Rotate by renaming instead of compressing
    #[arg(long, global = true)]
    rename: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit one record
    Log {
        /// Severity: debug, info, warn or error
        #[arg(short, long, default_value = "info")]
        level: Level,

        /// Message text
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Archive the log file into a dated artifact and start a fresh one
    Rotate {
        /// Directory that receives the artifact
        dest: PathBuf,
    },
    /// Emit a fatal record and exit with status 1
    Fatal {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Print the resolved configuration
    Config,
}

fn resolve_config(cli: &Cli) -> Result<LogConfig> {
    let mut config = match &cli.config {
        Some(path) => LogConfig::load_from(path)?,
        None => LogConfig::load()?,
    };
    config.apply_env()?;

    if let Some(file) = &cli.file {
        config.path = Some(file.clone());
    }
    if cli.rename {
        config.rotation = RotationMode::Rename;
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let trace = logging::init();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Log { level, message } => {
            let log = LogWriter::new(config).context("Failed to open log file")?;
            let message = message.join(" ");
            match level {
                Level::Debug => conlog::debug!(log, "{}", message),
                Level::Info => conlog::info!(log, "{}", message),
                Level::Warn => conlog::warn!(log, "{}", message),
                Level::Error => conlog::error!(log, "{}", message),
                Level::None => anyhow::bail!("Cannot log at level 'none'"),
            }
            log.flush();
        }
        Commands::Rotate { dest } => {
            let log = LogWriter::new(config).context("Failed to open log file")?;
            match log.rotate(&dest).context("Rotation failed")? {
                Some(artifact) => println!(
                    "{} {}",
                    style("Rotated to").green(),
                    style(artifact.display()).bold()
                ),
                None => println!("{}", style("No log file configured, nothing to rotate").dim()),
            }
        }
        Commands::Fatal { message } => {
            let log = LogWriter::new(config).context("Failed to open log file")?;
            // fatal exits without unwinding; flush queued trace events first
            drop(trace);
            conlog::fatal!(log, "{}", message.join(" "));
        }
    }

    Ok(())
}
