//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Besides the
//! configuration itself it loads the form definition, so a broken schema is
//! reported before an export is attempted.

use crate::cli::EXIT_CONFIG_ERROR;
use crate::config::load_config;
use crate::domain::FormDefinition;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let schema = match FormDefinition::load(&config.form.definition)
            .and_then(FormDefinition::into_schema)
        {
            Ok(schema) => {
                println!("✅ Form definition loaded: {}", config.form.definition);
                schema
            }
            Err(e) => {
                println!("❌ Failed to load form definition");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Form: {} ({})", config.form.name, config.form.id);
        println!("  Fields: {}", schema.len() - 1);
        println!("  Repeat Groups: {}", schema.repeat_groups().len());
        println!("  Spatial Fields: {}", schema.spatial_fields().len());
        println!("  Submissions: {}", config.form.storage_dir);
        println!("  Export Directory: {}", config.export.export_dir);
        println!("  Include Media: {}", config.export.include_media);
        println!("  Split Select Multiples: {}", config.export.split_select_multiples);
        println!("  Overwrite Files: {}", config.export.overwrite_files);
        println!("  Smart Append: {}", config.export.smart_append);
        println!("  GeoJSON: {}", config.export.include_geojson);
        println!("  Parallelism: {}", config.export.parallelism);
        println!("  Checkpoint File: {}", config.checkpoint_file());
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let code = ValidateArgs {}
            .execute(&path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_valid_config_and_definition() {
        let dir = TempDir::new().unwrap();
        let definition = dir.path().join("form.toml");
        std::fs::write(
            &definition,
            "name = \"data\"\n\n[[fields]]\nname = \"name\"\nkind = \"text\"\n",
        )
        .unwrap();
        let config = dir.path().join("formcast.toml");
        std::fs::write(
            &config,
            format!(
                "[form]\nid = \"f\"\nname = \"Form\"\ndefinition = \"{}\"\nstorage_dir = \"instances\"\n\n[export]\nexport_dir = \"out\"\n",
                definition.display()
            ),
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(&config.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
