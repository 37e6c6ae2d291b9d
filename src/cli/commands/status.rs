//! Status command implementation
//!
//! This module implements the `status` command, which prints the stored
//! export checkpoints.

use crate::adapters::filesystem::JsonFileCheckpointStorage;
use crate::cli::{EXIT_CONFIG_ERROR, EXIT_FATAL};
use crate::config::load_config;
use crate::core::state::{Checkpoint, ExportStatus, StateManager};
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Show every form in the checkpoint file, not only the configured one
    #[arg(long)]
    pub all: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("📊 Export Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let storage = JsonFileCheckpointStorage::new(config.checkpoint_file());
        let state_manager = StateManager::new_with_storage(Arc::new(storage));

        let checkpoints = match state_manager.get_all_checkpoints().await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load checkpoints");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let selected: Vec<&Checkpoint> = checkpoints
            .iter()
            .filter(|c| self.all || c.form_id.as_str() == config.form.id)
            .collect();

        if selected.is_empty() {
            println!("No export history found.");
            println!("Run 'formcast export' to start exporting submissions.");
            return Ok(0);
        }

        println!("Found {} checkpoint(s):", selected.len());
        println!();
        println!(
            "{:<24} {:<16} {:<10} {:<26} {:<20}",
            "Form ID", "Status", "Count", "Last Submission", "Last Export"
        );
        println!("{}", "-".repeat(100));

        for checkpoint in selected {
            let last_submission = checkpoint
                .last_exported_timestamp
                .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .unwrap_or_else(|| "-".to_string());
            let last_export = checkpoint
                .last_export_completed_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "Never".to_string());

            println!(
                "{:<24} {:<16} {:<10} {:<26} {:<20}",
                checkpoint.form_id.as_str(),
                status_label(checkpoint.last_export_status),
                checkpoint.submissions_exported_count,
                last_submission,
                last_export
            );
        }

        println!();
        Ok(0)
    }
}

fn status_label(status: ExportStatus) -> &'static str {
    match status {
        ExportStatus::Completed => "✅ Completed",
        ExportStatus::InProgress => "🔄 In Progress",
        ExportStatus::Failed => "❌ Failed",
        ExportStatus::Interrupted => "⚠️  Interrupted",
        ExportStatus::NotStarted => "⏸️  Not Started",
    }
}
