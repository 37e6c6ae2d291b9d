//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::domain::SubmissionError;
use std::path::PathBuf;
use std::time::Duration;

/// Stage of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// Listing, parsing and validating candidates
    Parsing,
    /// Mapping submissions to lines
    Rendering,
    /// Flushing line sets to their files
    Writing,
}

/// How a finished run went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Every candidate was rendered (including a run without candidates)
    AllExported,
    /// At least one candidate was rendered and at least one skipped
    SomeSkipped,
    /// Candidates existed but none was rendered
    AllSkipped,
}

impl ExportOutcome {
    /// Process exit code for the outcome
    pub fn exit_code(self) -> i32 {
        match self {
            ExportOutcome::AllExported => 0,
            ExportOutcome::SomeSkipped => 1,
            ExportOutcome::AllSkipped => 3,
        }
    }
}

/// A written output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Rows (or features) written by this run
    pub rows: usize,
}

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Number of candidate submissions listed
    pub candidates: usize,

    /// Number of submissions rendered into the output files
    pub exported: usize,

    /// Number of submissions excluded, cancelled ones included
    pub skipped: usize,

    /// Number of submissions left untouched after a shutdown signal
    pub cancelled: usize,

    /// Files written during the run
    pub files: Vec<FileReport>,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,

    /// Whether a shutdown signal cut the run short
    pub interrupted: bool,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            candidates: 0,
            exported: 0,
            skipped: 0,
            cancelled: 0,
            files: Vec::new(),
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            interrupted: false,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Record a written file
    pub fn add_file(&mut self, path: PathBuf, rows: usize) {
        self.files.push(FileReport { path, rows });
    }

    /// Classify the run
    pub fn outcome(&self) -> ExportOutcome {
        if self.skipped == 0 {
            ExportOutcome::AllExported
        } else if self.exported > 0 {
            ExportOutcome::SomeSkipped
        } else {
            ExportOutcome::AllSkipped
        }
    }

    /// Check if every candidate was exported
    pub fn is_successful(&self) -> bool {
        self.outcome() == ExportOutcome::AllExported
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.candidates == 0 {
            return 100.0;
        }
        (self.exported as f64 / self.candidates as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            candidates = self.candidates,
            exported = self.exported,
            skipped = self.skipped,
            cancelled = self.cancelled,
            interrupted = self.interrupted,
            outcome = ?self.outcome(),
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export finished"
        );

        for file in &self.files {
            tracing::debug!(file = %file.path.display(), rows = file.rows, "Output file");
        }

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    phase = ?error.phase,
                    message = %error.message,
                    context = ?error.context,
                    "Export error"
                );
            }
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Malformed or unreadable submission document
    Parse,
    /// Submission of an encrypted form that could not be decrypted
    Decryption,
    /// Structurally invalid submission
    Invalid,
    /// Output or media I/O
    Storage,
    /// Checkpoint persistence
    State,
    /// Unknown error
    Unknown,
}

impl From<&SubmissionError> for ExportErrorType {
    fn from(error: &SubmissionError) -> Self {
        match error {
            SubmissionError::Parse { .. } => ExportErrorType::Parse,
            SubmissionError::Decryption { .. } => ExportErrorType::Decryption,
            SubmissionError::MissingInstanceId { .. } | SubmissionError::Invalid { .. } => {
                ExportErrorType::Invalid
            }
        }
    }
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Stage the error occurred in
    pub phase: ExportPhase,

    /// Error message
    pub message: String,

    /// Optional context (e.g., source file, archived copy)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, phase: ExportPhase, message: String) -> Self {
        Self {
            error_type,
            phase,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

impl From<&SubmissionError> for ExportError {
    fn from(error: &SubmissionError) -> Self {
        ExportError::new(error.into(), ExportPhase::Parsing, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn summary(candidates: usize, exported: usize, skipped: usize) -> ExportSummary {
        ExportSummary {
            candidates,
            exported,
            skipped,
            ..ExportSummary::new()
        }
    }

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new();
        assert_eq!(summary.candidates, 0);
        assert_eq!(summary.exported, 0);
        assert_eq!(summary.skipped, 0);
        assert!(summary.files.is_empty());
        assert!(!summary.interrupted);
        assert_eq!(summary.duration, Duration::from_secs(0));
    }

    #[test_case(0, 0, 0, ExportOutcome::AllExported ; "no candidates")]
    #[test_case(3, 3, 0, ExportOutcome::AllExported ; "all rendered")]
    #[test_case(3, 2, 1, ExportOutcome::SomeSkipped ; "partial")]
    #[test_case(3, 0, 3, ExportOutcome::AllSkipped ; "nothing rendered")]
    fn test_outcome(candidates: usize, exported: usize, skipped: usize, expected: ExportOutcome) {
        assert_eq!(summary(candidates, exported, skipped).outcome(), expected);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExportOutcome::AllExported.exit_code(), 0);
        assert_eq!(ExportOutcome::SomeSkipped.exit_code(), 1);
        assert_eq!(ExportOutcome::AllSkipped.exit_code(), 3);
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(summary(4, 3, 1).success_rate(), 75.0);
        assert_eq!(summary(0, 0, 0).success_rate(), 100.0);
    }

    #[test]
    fn test_error_from_submission_error() {
        let error = ExportError::from(&SubmissionError::parse("a/submission.xml", "bad"))
            .with_context("archived=errors/failed_submission_1.xml".to_string());
        assert_eq!(error.error_type, ExportErrorType::Parse);
        assert_eq!(error.phase, ExportPhase::Parsing);
        assert!(error.message.contains("bad"));
        assert!(error.context.is_some());
    }

    #[test]
    fn test_add_file() {
        let mut summary = ExportSummary::new();
        summary.add_file(PathBuf::from("out/Form.csv"), 2);
        assert_eq!(summary.files[0].rows, 2);
    }
}
