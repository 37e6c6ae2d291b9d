//! Logging and observability
//!
//! Structured logging through `tracing`: a console layer, an optional JSON
//! file layer with rotation, and a few macros for the events every export
//! run emits.
//!
//! # Example
//!
//! ```no_run
//! use formcast::logging::init_logging;
//! use formcast::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use formcast::log_export_start;
/// use formcast::domain::ids::FormId;
///
/// let form_id = FormId::new("household").unwrap();
/// log_export_start!(&form_id, 12);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($form_id:expr, $candidates:expr) => {
        tracing::info!(
            form_id = %$form_id,
            candidates = $candidates,
            "Starting export"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use formcast::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration.as_millis(),
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use formcast::log_error_with_context;
/// use formcast::domain::FormcastError;
///
/// let error = FormcastError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a submission excluded from rendering
///
/// # Example
///
/// ```no_run
/// use formcast::log_submission_skipped;
///
/// log_submission_skipped!("instances/a/submission.xml", "malformed XML", "errors/failed_submission_1.xml");
/// ```
#[macro_export]
macro_rules! log_submission_skipped {
    ($file:expr, $reason:expr, $archived:expr) => {
        tracing::warn!(
            file = %$file,
            reason = %$reason,
            archived = %$archived,
            "Submission skipped"
        );
    };
}
