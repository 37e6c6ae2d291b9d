//! Collaborator traits
//!
//! The export engine reaches storage only through these traits: a source of
//! candidate submission files, a parser turning a file into a [`Submission`],
//! and a store for export checkpoints.

use crate::config::SecretString;
use crate::core::state::Checkpoint;
use crate::domain::ids::FormId;
use crate::domain::{Result, Submission, SubmissionError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;

/// Inclusive submission date filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Whether neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a submission date passes the filter
    ///
    /// Dates compare on their UTC calendar day. Undated submissions only
    /// pass an unbounded range.
    pub fn contains(&self, date: Option<DateTime<Utc>>) -> bool {
        let Some(date) = date else {
            return self.is_unbounded();
        };
        let day = date.date_naive();
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }
}

/// A candidate submission file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    /// The submission document
    pub path: PathBuf,
    /// Directory holding its attachments
    pub working_dir: PathBuf,
    /// Submission date read from the document, if any
    pub submission_date: Option<DateTime<Utc>>,
}

/// Lists candidate submission files
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    /// Candidates within `range` and, when given, strictly after `only_after`
    ///
    /// Candidates come back ordered by submission date, undated first.
    async fn list_submissions(
        &self,
        range: DateRange,
        only_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<SubmissionFile>>;
}

/// Turns a submission file into a parsed submission
///
/// Parsing runs on blocking worker threads, so this trait is synchronous.
pub trait SubmissionParser: Send + Sync {
    fn parse(
        &self,
        file: &SubmissionFile,
        encrypted: bool,
        private_key: Option<&SecretString>,
    ) -> std::result::Result<Submission, SubmissionError>;
}

/// Persists export checkpoints
#[async_trait]
pub trait CheckpointStorage: Send + Sync {
    /// Load the checkpoint of a form
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` when the form was never exported.
    async fn load_checkpoint(&self, form_id: &FormId) -> Result<Option<Checkpoint>>;

    /// Save (create or replace) the checkpoint of a form
    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()>;

    /// All stored checkpoints
    async fn get_all_checkpoints(&self) -> Result<Vec<Checkpoint>>;
}
