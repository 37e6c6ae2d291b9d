//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for formcast using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Exit code of a configuration error
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code of a fatal error
pub const EXIT_FATAL: i32 = 5;
/// Exit code of a run cut short by a shutdown signal
pub const EXIT_INTERRUPTED: i32 = 130;

/// Formcast - form submission CSV/GeoJSON exporter
#[derive(Parser, Debug)]
#[command(name = "formcast")]
#[command(version, about, long_about = None)]
#[command(author = "Formcast Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "formcast.toml", env = "FORMCAST_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FORMCAST_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the configured form's submissions to CSV (and GeoJSON)
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the stored export checkpoints
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
