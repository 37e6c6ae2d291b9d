//! Configuration schema types
//!
//! This module defines the configuration structure for formcast.

use crate::config::SecretString;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Main formcast configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormcastConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// The form being exported
    pub form: FormConfig,

    /// Export settings
    pub export: ExportConfig,

    /// Checkpoint state configuration
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FormcastConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.form.validate()?;
        self.export.validate(&self.form)?;
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Path of the checkpoint file, resolved against the export directory
    pub fn checkpoint_file(&self) -> String {
        self.state.checkpoint_file.clone().unwrap_or_else(|| {
            std::path::Path::new(&self.export.export_dir)
                .join(".formcast-state.json")
                .to_string_lossy()
                .to_string()
        })
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Form configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Form identifier (checkpoint key)
    pub id: String,

    /// Base name of the output files
    pub name: String,

    /// Path to the form definition file (TOML or JSON)
    pub definition: String,

    /// Directory holding one sub-directory per submission
    pub storage_dir: String,

    /// Whether submissions are encrypted per file
    #[serde(default)]
    pub encrypted: bool,
}

impl FormConfig {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("form.id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("form.name cannot be empty".to_string());
        }
        if self.name.contains(['/', '\\']) {
            return Err(format!(
                "form.name '{}' cannot contain path separators",
                self.name
            ));
        }
        if self.definition.trim().is_empty() {
            return Err("form.definition cannot be empty".to_string());
        }
        if self.storage_dir.trim().is_empty() {
            return Err("form.storage_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving CSV, GeoJSON, media and error files
    pub export_dir: String,

    /// Copy attachments into the media directory (default: true)
    #[serde(default = "default_true")]
    pub include_media: bool,

    /// Add one indicator column per choice of multiple-choice lists
    #[serde(default)]
    pub split_select_multiples: bool,

    /// Name columns after the field only, without group names
    #[serde(default)]
    pub remove_group_names: bool,

    /// Overwrite existing output files instead of appending
    #[serde(default)]
    pub overwrite_files: bool,

    /// Only export submissions newer than the last checkpoint
    #[serde(default)]
    pub smart_append: bool,

    /// Also write a GeoJSON feature collection
    #[serde(default)]
    pub include_geojson: bool,

    /// First submission date to export (inclusive)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last submission date to export (inclusive)
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Number of submissions processed concurrently
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Private key (PEM) for encrypted forms
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub private_key: Option<SecretString>,
}

impl ExportConfig {
    fn validate(&self, form: &FormConfig) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.export_dir.trim().is_empty() {
            return Err("export.export_dir cannot be empty".to_string());
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(format!(
                    "export.start_date ({start}) must not be after export.end_date ({end})"
                ));
            }
        }

        if self.parallelism == 0 || self.parallelism > 64 {
            return Err(format!(
                "export.parallelism must be between 1 and 64, got {}",
                self.parallelism
            ));
        }

        if form.encrypted
            && self
                .private_key
                .as_ref()
                .map(|k| k.expose_secret().as_str().is_empty())
                .unwrap_or(true)
        {
            return Err("export.private_key is required for encrypted forms".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_dir: "exports".to_string(),
            include_media: true,
            split_select_multiples: false,
            remove_group_names: false,
            overwrite_files: false,
            smart_append: false,
            include_geojson: false,
            start_date: None,
            end_date: None,
            parallelism: default_parallelism(),
            private_key: None,
        }
    }
}

/// Checkpoint state configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StateConfig {
    /// Checkpoint file (default: `<export_dir>/.formcast-state.json`)
    #[serde(default)]
    pub checkpoint_file: Option<String>,
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.checkpoint_file {
            if path.trim().is_empty() {
                return Err("state.checkpoint_file cannot be empty when set".to_string());
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_parallelism() -> usize {
    4
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
