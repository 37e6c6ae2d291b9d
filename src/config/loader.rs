//! Configuration loader with TOML parsing and environment variable overrides
//!
//! This module implements configuration loading following TR-4.2.

use super::schema::FormcastConfig;
use super::secret::secret_string;
use crate::domain::errors::FormcastError;
use crate::domain::result::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FormcastConfig
/// 4. Applies environment variable overrides (FORMCAST_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use formcast::config::loader::load_config;
///
/// let config = load_config("formcast.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FormcastConfig> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(FormcastError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    // Read file contents
    let contents = fs::read_to_string(path).map_err(|e| {
        FormcastError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: FormcastConfig = toml::from_str(&contents)
        .map_err(|e| FormcastError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config)?;

    // Validate configuration
    config.validate().map_err(|e| {
        FormcastError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Arguments
///
/// * `input` - String containing ${VAR} placeholders
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FormcastError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        // Process non-comment lines for env var substitution
        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FormcastError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using FORMCAST_* prefix
///
/// Environment variables follow the pattern: FORMCAST_<SECTION>_<KEY>
/// For example: FORMCAST_EXPORT_EXPORT_DIR, FORMCAST_EXPORT_OVERWRITE_FILES
///
/// # Arguments
///
/// * `config` - Mutable reference to the configuration to update
fn apply_env_overrides(config: &mut FormcastConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("FORMCAST_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Form overrides
    if let Ok(val) = std::env::var("FORMCAST_FORM_DEFINITION") {
        config.form.definition = val;
    }
    if let Ok(val) = std::env::var("FORMCAST_FORM_STORAGE_DIR") {
        config.form.storage_dir = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_EXPORT_DIR") {
        config.export.export_dir = val;
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_INCLUDE_MEDIA") {
        config.export.include_media = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_OVERWRITE_FILES") {
        config.export.overwrite_files = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_SMART_APPEND") {
        config.export.smart_append = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_INCLUDE_GEOJSON") {
        config.export.include_geojson = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_PARALLELISM") {
        if let Ok(parallelism) = val.parse() {
            config.export.parallelism = parallelism;
        }
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_START_DATE") {
        config.export.start_date = Some(parse_date_override("FORMCAST_EXPORT_START_DATE", &val)?);
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_END_DATE") {
        config.export.end_date = Some(parse_date_override("FORMCAST_EXPORT_END_DATE", &val)?);
    }
    if let Ok(val) = std::env::var("FORMCAST_EXPORT_PRIVATE_KEY") {
        config.export.private_key = Some(secret_string(val));
    }

    // State overrides
    if let Ok(val) = std::env::var("FORMCAST_STATE_CHECKPOINT_FILE") {
        config.state.checkpoint_file = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FORMCAST_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FORMCAST_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_date_override(name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        FormcastError::Configuration(format!("{name} must be an ISO date (YYYY-MM-DD): {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FORMCAST_TEST_KEY", "test_value");
        let input = "private_key = \"${FORMCAST_TEST_KEY}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result.trim_end(), "private_key = \"test_value\"");
        std::env::remove_var("FORMCAST_TEST_KEY");
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("FORMCAST_UNSET_IN_COMMENT");
        let input = "# key = \"${FORMCAST_UNSET_IN_COMMENT}\"\nname = \"x\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${FORMCAST_UNSET_IN_COMMENT}"));
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FORMCAST_MISSING_VAR");
        let input = "private_key = \"${FORMCAST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_date_override() {
        assert_eq!(
            parse_date_override("X", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date_override("X", "29/02/2024").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[form]
id = "household"
name = "Household Survey"
definition = "household.toml"
storage_dir = "instances"

[export]
export_dir = "exports"
split_select_multiples = true
start_date = "2024-01-01"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.form.name, "Household Survey");
        assert!(config.export.split_select_multiples);
        assert!(config.export.include_media);
        assert_eq!(
            config.export.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }
}
