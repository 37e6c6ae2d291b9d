// Formcast - Form submission CSV/GeoJSON exporter
// Copyright (c) 2025 Formcast Contributors
// Licensed under the MIT License

//! # Formcast - Form submission CSV/GeoJSON exporter
//!
//! Formcast turns a directory of collected form submissions (one XML
//! document per submission, plus its attachments) into analysis-ready files.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Rendering** submissions to CSV, one file for the form and one per
//!   repeat group, linked through `KEY`/`PARENT_KEY`
//! - **Expanding** multiple-choice answers into indicator columns
//! - **Copying** attachments into a `media/` directory with content deduplication
//! - **Aggregating** audit logs into a single per-form audit file
//! - **Building** a GeoJSON feature collection from spatial fields
//! - **Checkpointing** the last exported submission for incremental runs
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (CSV rendering, export, GeoJSON, state)
//! - [`adapters`] - Submission storage, XML parsing and checkpoint files
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formcast::config::load_config;
//! use formcast::core::export::ExportCoordinator;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("formcast.toml")?;
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let coordinator = ExportCoordinator::new(config, shutdown_rx).await?;
//!
//!     let summary = coordinator.execute_export().await?;
//!     println!("Exported {} of {} submissions", summary.exported, summary.candidates);
//!     Ok(())
//! }
//! ```
//!
//! ## CSV Encoding
//!
//! Values are encoded one column at a time. Commas, quotes and newlines force
//! quoting; empty values become `""` unless the column allows a bare empty
//! field:
//!
//! ```rust
//! use formcast::core::csv::encode_value;
//!
//! assert_eq!(encode_value(Some("a,b"), false), "\"a,b\"");
//! assert_eq!(encode_value(None, false), "\"\"");
//! assert_eq!(encode_value(None, true), "");
//! ```
//!
//! ## Error Handling
//!
//! Formcast uses the [`domain::FormcastError`] type for all errors. Problems
//! with a single submission ([`domain::SubmissionError`]) never abort a run:
//! the submission is skipped, copied to the errors directory and reported in
//! the [`core::export::ExportSummary`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
