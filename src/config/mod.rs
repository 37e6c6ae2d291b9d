//! Configuration management for formcast.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! formcast uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FORMCAST_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use formcast::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("formcast.toml")?;
//!
//! println!("Form: {}", config.form.name);
//! println!("Export dir: {}", config.export.export_dir);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`FormConfig`] - The form being exported and where its submissions live
//! - [`ExportConfig`] - Output options (media, choice splitting, date range, parallelism)
//! - [`StateConfig`] - Checkpoint file location
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [form]
//! id = "household"
//! name = "Household Survey"
//! definition = "forms/household.toml"
//! storage_dir = "instances"
//!
//! [export]
//! export_dir = "exports"
//! split_select_multiples = true
//! smart_append = true
//! include_geojson = true
//! parallelism = 8
//! private_key = "${FORMCAST_PRIVATE_KEY}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportConfig, FormConfig, FormcastConfig, LoggingConfig, StateConfig,
};
pub use secret::{secret_string, SecretString};
