//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_FATAL};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "formcast.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing formcast configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your form and directories", self.output);
                println!("  2. Describe the form fields in the definition file");
                println!("  3. For encrypted forms, set FORMCAST_PRIVATE_KEY in a .env file");
                println!("  4. Validate configuration: formcast validate-config");
                println!("  5. Run export: formcast export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# formcast configuration file

[application]
log_level = "info"

[form]
id = "household"
name = "Household Survey"
definition = "household.toml"
storage_dir = "instances"

[export]
export_dir = "exports"
include_media = true
overwrite_files = false
smart_append = false

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# formcast configuration file
#
# Every option is listed with its default. Values may reference environment
# variables as ${VAR}; FORMCAST_<SECTION>_<KEY> variables override any value.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Form
# ============================================================================
[form]
# Checkpoint key of the form
id = "household"

# Base name of the output files: "<name>.csv", "<name>-<group>.csv", ...
name = "Household Survey"

# Field tree of the form (TOML or JSON)
definition = "household.toml"

# Directory holding one sub-directory per submission, each with a
# submission.xml and its attachments
storage_dir = "instances"

# Submissions are encrypted per file (adds the isValidated column)
encrypted = false

# ============================================================================
# Export
# ============================================================================
[export]
# Output directory for CSV, GeoJSON, media and rejected submissions
export_dir = "exports"

# Copy attachments into <export_dir>/media
include_media = true

# One 0/1 column per choice of multiple-choice lists
split_select_multiples = false

# Name columns after the field only, without group names
remove_group_names = false

# Overwrite output files instead of appending rows
overwrite_files = false

# Only export submissions newer than the last checkpoint
smart_append = false

# Also write "<name>.geojson" for spatial fields
include_geojson = false

# Inclusive submission date filter
# start_date = "2024-01-01"
# end_date = "2024-12-31"

# Submissions processed concurrently (1-64)
parallelism = 4

# Private key (PEM) for encrypted forms
# private_key = "${FORMCAST_PRIVATE_KEY}"

# ============================================================================
# Checkpoint State
# ============================================================================
[state]
# Defaults to <export_dir>/.formcast-state.json
# checkpoint_file = "state/formcast-state.json"

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files next to console output
local_enabled = false
local_path = "logs"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
