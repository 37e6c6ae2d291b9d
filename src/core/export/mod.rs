//! Export orchestration
//!
//! This module provides the export run of one form:
//! - [`options`]: the resolved, read-only export settings and output paths
//! - [`batch`]: per-submission processing and result folding
//! - [`coordinator`]: candidate listing, concurrency, writing, checkpointing
//! - [`archive`]: copies of rejected submissions
//! - [`summary`]: counts, outcome and errors of a run

pub mod archive;
pub mod batch;
pub mod coordinator;
pub mod options;
pub mod summary;

pub use archive::ErrorArchive;
pub use batch::{BatchResult, SubmissionOutcome, SubmissionProcessor};
pub use coordinator::ExportCoordinator;
pub use options::ExportOptions;
pub use summary::{
    ExportError, ExportErrorType, ExportOutcome, ExportPhase, ExportSummary, FileReport,
};
