//! Export command implementation
//!
//! This module implements the `export` command, which writes the configured
//! form's submissions to CSV files (and optionally GeoJSON).

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_INTERRUPTED};
use crate::config::{load_config, FormcastConfig};
use crate::core::export::{ExportCoordinator, ExportOutcome, ExportSummary};
use chrono::NaiveDate;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Override the first submission date to export (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Override the last submission date to export (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Overwrite output files instead of appending
    #[arg(long)]
    pub overwrite: bool,

    /// Only export submissions newer than the stored checkpoint
    #[arg(long)]
    pub smart_append: bool,

    /// Also write a GeoJSON document
    #[arg(long)]
    pub geojson: bool,

    /// Do not copy attachments into the media directory
    #[arg(long)]
    pub no_media: bool,

    /// Override the number of concurrent submission tasks
    #[arg(long)]
    pub parallelism: Option<usize>,
}

impl ExportArgs {
    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut FormcastConfig) {
        if let Some(start) = self.start_date {
            tracing::info!(start_date = %start, "Overriding start date from CLI");
            config.export.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            tracing::info!(end_date = %end, "Overriding end date from CLI");
            config.export.end_date = Some(end);
        }
        if self.overwrite {
            config.export.overwrite_files = true;
        }
        if self.smart_append {
            config.export.smart_append = true;
        }
        if self.geojson {
            config.export.include_geojson = true;
        }
        if self.no_media {
            config.export.include_media = false;
        }
        if let Some(parallelism) = self.parallelism {
            config.export.parallelism = parallelism;
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        if !self.yes {
            println!("Export Configuration:");
            println!("  Form: {} ({})", config.form.name, config.form.id);
            println!("  Submissions: {}", config.form.storage_dir);
            println!("  Export directory: {}", config.export.export_dir);
            println!(
                "  Date range: {} .. {}",
                config.export.start_date.map_or("-".to_string(), |d| d.to_string()),
                config.export.end_date.map_or("-".to_string(), |d| d.to_string())
            );
            println!(
                "  Mode: {}",
                if config.export.overwrite_files { "overwrite" } else { "append" }
            );
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let coordinator = match ExportCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("🚀 Starting export...");
        println!();

        let summary = match coordinator.execute_export().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Candidates: {}", summary.candidates);
    println!("  Exported: {}", summary.exported);
    println!("  Skipped: {}", summary.skipped);
    if summary.cancelled > 0 {
        println!("  Cancelled: {}", summary.cancelled);
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    for file in &summary.files {
        println!("  {} ({} rows)", file.path.display(), file.rows);
    }
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Skipped submissions:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}

/// Exit code of a finished run
pub fn exit_code(summary: &ExportSummary) -> i32 {
    if summary.interrupted {
        println!("⚠️  Export interrupted. Run with --smart-append to resume after the checkpoint.");
        tracing::info!("Export interrupted by user signal");
        return EXIT_INTERRUPTED;
    }
    match summary.outcome() {
        ExportOutcome::AllExported => println!("✅ Export completed successfully!"),
        ExportOutcome::SomeSkipped => println!("⚠️  Export completed with skipped submissions"),
        ExportOutcome::AllSkipped => println!("❌ No submission could be exported"),
    }
    summary.outcome().exit_code()
}
