//! Domain error types
//!
//! This module defines the error hierarchy for formcast. Errors are split by
//! how the export run reacts to them: submission errors are recovered by
//! archiving the offending file, everything else aborts the run.

use thiserror::Error;

/// Main formcast error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum FormcastError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Form definition / schema errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// A single submission could not be used
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Line set merge contract violation
    #[error("Line set error: {0}")]
    LineSet(#[from] LineSetError),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Checkpoint state errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Reasons a submission is excluded from rendering
///
/// These never abort an export run. The orchestrator copies the offending
/// file into the errors directory and counts the submission as skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// The document could not be read or is not well-formed
    #[error("Failed to parse submission {file}: {reason}")]
    Parse { file: String, reason: String },

    /// The submission belongs to an encrypted form and cannot be decrypted
    #[error("Cannot decrypt submission {file}: {reason}")]
    Decryption { file: String, reason: String },

    /// The submission has no instance id
    #[error("Submission {file} has no instance ID")]
    MissingInstanceId { file: String },

    /// The submission tree disagrees with the form's repeat structure
    #[error("Submission {instance_id} is structurally invalid: {reason}")]
    Invalid { instance_id: String, reason: String },
}

impl SubmissionError {
    /// Creates a parse error for a file
    pub fn parse(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Line set merge contract violations
///
/// Both operands of a merge come from the same engine, so these indicate a
/// programming error rather than bad input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineSetError {
    /// Neither operand is tagged with an FQN
    #[error("Cannot merge two untagged line sets")]
    BothUntagged,

    /// Operands are tagged with different FQNs
    #[error("Cannot merge line sets of {left} and {right}")]
    FqnMismatch { left: String, right: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for FormcastError {
    fn from(err: std::io::Error) -> Self {
        FormcastError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FormcastError {
    fn from(err: serde_json::Error) -> Self {
        FormcastError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FormcastError {
    fn from(err: toml::de::Error) -> Self {
        FormcastError::Configuration(format!("TOML parse error: {err}"))
    }
}
