//! Core business logic for formcast.
//!
//! # Modules
//!
//! - [`csv`] - field mapping, value encoding, row rendering, media and audit files
//! - [`geojson`] - GeoJSON features for spatial fields
//! - [`export`] - export orchestration, rejected submission archive, summary
//! - [`state`] - per-form checkpoints for smart-append exports
//!
//! # Export Workflow
//!
//! 1. **Load State**: read the form's checkpoint
//! 2. **List**: candidate submissions within the date range, newer than the
//!    checkpoint when smart append is on
//! 3. **Render**: parse, validate and render submissions concurrently
//! 4. **Write**: flush the main file, repeat group files and GeoJSON
//! 5. **Checkpoint**: record the newest exported submission date
//! 6. **Report**: log the export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use formcast::config::load_config;
//! use formcast::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("formcast.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::new(config, shutdown_rx).await?;
//! let summary = coordinator.execute_export().await?;
//!
//! println!("Exported: {}", summary.exported);
//! println!("Skipped: {}", summary.skipped);
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod export;
pub mod geojson;
pub mod state;
