//! Resolved export options
//!
//! [`ExportOptions`] is the read-only view of the configuration that the
//! rendering engine and the orchestrator consume during a run. It also owns
//! the naming rules for every artifact written to the export directory.

use crate::adapters::DateRange;
use crate::config::{FormcastConfig, SecretString};
use crate::domain::ids::FormId;
use crate::domain::{FormcastError, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Name of the media sub-directory
pub const MEDIA_DIR: &str = "media";

/// Export options for one run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Checkpoint key of the form
    pub form_id: FormId,
    /// Base name of every output file
    pub form_name: String,
    /// Root of all output files
    pub export_dir: PathBuf,
    /// Copy attachments into the media directory
    pub include_media: bool,
    /// Add indicator columns for multiple-choice lists
    pub split_select_multiples: bool,
    /// Use bare field names as column names
    pub remove_group_names: bool,
    /// Truncate output files instead of appending
    pub overwrite_files: bool,
    /// Resume after the stored checkpoint
    pub smart_append: bool,
    /// Write the GeoJSON document
    pub include_geojson: bool,
    /// Inclusive start of the submission date filter
    pub start_date: Option<NaiveDate>,
    /// Inclusive end of the submission date filter
    pub end_date: Option<NaiveDate>,
    /// Concurrent submission tasks
    pub parallelism: usize,
    /// Whether the form encrypts submissions per file
    pub encrypted: bool,
    /// Key material for encrypted forms
    pub private_key: Option<SecretString>,
}

impl ExportOptions {
    /// Derives the options from a validated configuration
    pub fn from_config(config: &FormcastConfig) -> Result<Self> {
        let form_id = FormId::new(config.form.id.clone()).map_err(FormcastError::Configuration)?;

        Ok(Self {
            form_id,
            form_name: config.form.name.clone(),
            export_dir: PathBuf::from(&config.export.export_dir),
            include_media: config.export.include_media,
            split_select_multiples: config.export.split_select_multiples,
            remove_group_names: config.export.remove_group_names,
            overwrite_files: config.export.overwrite_files,
            smart_append: config.export.smart_append,
            include_geojson: config.export.include_geojson,
            start_date: config.export.start_date,
            end_date: config.export.end_date,
            parallelism: config.export.parallelism.max(1),
            encrypted: config.form.encrypted,
            private_key: config.export.private_key.clone(),
        })
    }

    /// Options with defaults for a form, writing into `export_dir`
    pub fn new(form_id: FormId, form_name: impl Into<String>, export_dir: impl AsRef<Path>) -> Self {
        Self {
            form_id,
            form_name: form_name.into(),
            export_dir: export_dir.as_ref().to_path_buf(),
            include_media: true,
            split_select_multiples: false,
            remove_group_names: false,
            overwrite_files: false,
            smart_append: false,
            include_geojson: false,
            start_date: None,
            end_date: None,
            parallelism: 4,
            encrypted: false,
            private_key: None,
        }
    }

    /// Submission date filter
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// `<export dir>/<form name>.csv`
    pub fn main_file(&self) -> PathBuf {
        self.export_dir.join(format!("{}.csv", self.form_name))
    }

    /// `<export dir>/<form name>-<group fqn>.csv`
    pub fn repeat_file(&self, group_fqn: &str) -> PathBuf {
        self.export_dir
            .join(format!("{}-{}.csv", self.form_name, group_fqn))
    }

    /// `<export dir>/<form name>.geojson`
    pub fn geojson_file(&self) -> PathBuf {
        self.export_dir.join(format!("{}.geojson", self.form_name))
    }

    /// `<export dir>/media`
    pub fn media_dir(&self) -> PathBuf {
        self.export_dir.join(MEDIA_DIR)
    }

    /// `<export dir>/<form name> - errors`
    pub fn errors_dir(&self) -> PathBuf {
        self.export_dir.join(format!("{} - errors", self.form_name))
    }

    /// `<export dir>/<form name> - audit.csv`
    pub fn audit_file(&self) -> PathBuf {
        self.export_dir.join(format!("{} - audit.csv", self.form_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ApplicationConfig, ExportConfig, FormConfig, LoggingConfig, StateConfig,
    };
    use std::str::FromStr;

    #[test]
    fn test_file_names() {
        let options = ExportOptions::new(FormId::from_str("hh").unwrap(), "Household", "/tmp/out");
        assert_eq!(options.main_file(), PathBuf::from("/tmp/out/Household.csv"));
        assert_eq!(
            options.repeat_file("members"),
            PathBuf::from("/tmp/out/Household-members.csv")
        );
        assert_eq!(options.geojson_file(), PathBuf::from("/tmp/out/Household.geojson"));
        assert_eq!(options.media_dir(), PathBuf::from("/tmp/out/media"));
        assert_eq!(options.errors_dir(), PathBuf::from("/tmp/out/Household - errors"));
        assert_eq!(options.audit_file(), PathBuf::from("/tmp/out/Household - audit.csv"));
    }

    #[test]
    fn test_from_config() {
        let config = FormcastConfig {
            application: ApplicationConfig::default(),
            form: FormConfig {
                id: "hh".to_string(),
                name: "Household".to_string(),
                definition: "hh.toml".to_string(),
                storage_dir: "instances".to_string(),
                encrypted: false,
            },
            export: ExportConfig {
                split_select_multiples: true,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                ..ExportConfig::default()
            },
            state: StateConfig::default(),
            logging: LoggingConfig::default(),
        };

        let options = ExportOptions::from_config(&config).unwrap();
        assert_eq!(options.form_id.as_str(), "hh");
        assert!(options.split_select_multiples);
        assert_eq!(options.date_range().start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(options.date_range().end, None);
    }
}
