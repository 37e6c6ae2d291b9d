//! Checkpoint model for resuming exports
//!
//! A checkpoint records, per form, the submission date of the most recent
//! exported submission. Smart-append runs only export submissions strictly
//! newer than it.

use crate::domain::ids::FormId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Export status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// Export is in progress
    InProgress,
    /// Export completed successfully
    Completed,
    /// Export failed with an error
    Failed,
    /// Export was interrupted by a shutdown signal
    Interrupted,
    /// Export was never started
    #[default]
    NotStarted,
}

/// Export checkpoint of one form
///
/// # Examples
///
/// ```
/// use formcast::core::state::{CheckpointBuilder, ExportStatus};
/// use formcast::domain::ids::FormId;
/// use std::str::FromStr;
///
/// let checkpoint = CheckpointBuilder::new(FormId::from_str("household").unwrap())
///     .submissions_exported_count(12)
///     .build();
///
/// assert_eq!(checkpoint.submissions_exported_count, 12);
/// assert_eq!(checkpoint.last_export_status, ExportStatus::NotStarted);
/// assert!(checkpoint.last_exported_timestamp.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Form this checkpoint tracks
    pub form_id: FormId,

    /// Submission date of the most recent exported submission
    pub last_exported_timestamp: Option<DateTime<Utc>>,

    /// Instance id of that submission
    pub last_exported_instance_id: Option<String>,

    /// Total submissions exported across runs
    pub submissions_exported_count: u64,

    /// When the last run started
    pub last_export_started_at: DateTime<Utc>,

    /// When the last run ended (None while in progress)
    pub last_export_completed_at: Option<DateTime<Utc>>,

    /// Status of the last run
    pub last_export_status: ExportStatus,
}

impl Checkpoint {
    pub fn is_in_progress(&self) -> bool {
        self.last_export_status == ExportStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.last_export_status == ExportStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.last_export_status == ExportStatus::Failed
    }

    /// Duration of the last run if it ended
    pub fn last_export_duration(&self) -> Option<chrono::Duration> {
        self.last_export_completed_at
            .map(|completed| completed - self.last_export_started_at)
    }

    /// Mark the export as started
    pub fn mark_started(&mut self) {
        self.last_export_started_at = Utc::now();
        self.last_export_status = ExportStatus::InProgress;
        self.last_export_completed_at = None;
    }

    /// Mark the export as completed
    pub fn mark_completed(&mut self) {
        self.finish(ExportStatus::Completed);
    }

    /// Mark the export as failed
    pub fn mark_failed(&mut self) {
        self.finish(ExportStatus::Failed);
    }

    /// Mark the export as interrupted
    pub fn mark_interrupted(&mut self) {
        self.finish(ExportStatus::Interrupted);
    }

    fn finish(&mut self, status: ExportStatus) {
        self.last_export_completed_at = Some(Utc::now());
        self.last_export_status = status;
    }

    /// Records the outcome of a run
    ///
    /// `timestamp` is the submission date of the most recent exported
    /// submission, when it has one. The stored timestamp never moves back.
    pub fn update_after_export(
        &mut self,
        instance_id: Option<String>,
        timestamp: Option<DateTime<Utc>>,
        exported: u64,
    ) {
        if let Some(timestamp) = timestamp {
            if self.last_exported_timestamp.map_or(true, |t| timestamp >= t) {
                self.last_exported_timestamp = Some(timestamp);
                self.last_exported_instance_id = instance_id;
            }
        }
        self.submissions_exported_count += exported;
    }
}

/// Builder for creating Checkpoint instances
pub struct CheckpointBuilder {
    form_id: FormId,
    last_exported_timestamp: Option<DateTime<Utc>>,
    last_exported_instance_id: Option<String>,
    submissions_exported_count: u64,
    last_export_status: ExportStatus,
}

impl CheckpointBuilder {
    pub fn new(form_id: FormId) -> Self {
        Self {
            form_id,
            last_exported_timestamp: None,
            last_exported_instance_id: None,
            submissions_exported_count: 0,
            last_export_status: ExportStatus::NotStarted,
        }
    }

    /// Set the last exported timestamp
    pub fn last_exported_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.last_exported_timestamp = Some(timestamp);
        self
    }

    /// Set the last exported instance id
    pub fn last_exported_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.last_exported_instance_id = Some(instance_id.into());
        self
    }

    /// Set the exported submission count
    pub fn submissions_exported_count(mut self, count: u64) -> Self {
        self.submissions_exported_count = count;
        self
    }

    /// Set the last export status
    pub fn last_export_status(mut self, status: ExportStatus) -> Self {
        self.last_export_status = status;
        self
    }

    pub fn build(self) -> Checkpoint {
        Checkpoint {
            form_id: self.form_id,
            last_exported_timestamp: self.last_exported_timestamp,
            last_exported_instance_id: self.last_exported_instance_id,
            submissions_exported_count: self.submissions_exported_count,
            last_export_started_at: Utc::now(),
            last_export_completed_at: None,
            last_export_status: self.last_export_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn checkpoint() -> Checkpoint {
        CheckpointBuilder::new(FormId::from_str("household").unwrap()).build()
    }

    #[test]
    fn test_mark_started_and_completed() {
        let mut checkpoint = checkpoint();
        checkpoint.mark_started();
        assert!(checkpoint.is_in_progress());
        assert!(checkpoint.last_export_completed_at.is_none());

        checkpoint.mark_completed();
        assert!(checkpoint.is_completed());
        assert!(checkpoint.last_export_duration().is_some());
    }

    #[test]
    fn test_mark_failed_and_interrupted() {
        let mut checkpoint = checkpoint();
        checkpoint.mark_started();
        checkpoint.mark_failed();
        assert!(checkpoint.is_failed());

        checkpoint.mark_interrupted();
        assert_eq!(checkpoint.last_export_status, ExportStatus::Interrupted);
    }

    #[test]
    fn test_update_after_export_never_moves_back() {
        let mut checkpoint = checkpoint();
        let later = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        checkpoint.update_after_export(Some("uuid:2".to_string()), Some(later), 3);
        checkpoint.update_after_export(Some("uuid:1".to_string()), Some(earlier), 1);
        checkpoint.update_after_export(None, None, 2);

        assert_eq!(checkpoint.last_exported_timestamp, Some(later));
        assert_eq!(checkpoint.last_exported_instance_id.as_deref(), Some("uuid:2"));
        assert_eq!(checkpoint.submissions_exported_count, 6);
    }

    #[test]
    fn test_checkpoint_serialization() {
        let checkpoint = CheckpointBuilder::new(FormId::from_str("household").unwrap())
            .last_exported_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
            .last_exported_instance_id("uuid:9")
            .last_export_status(ExportStatus::Completed)
            .build();

        let json = serde_json::to_string(&checkpoint).unwrap();
        assert!(json.contains("household"));
        assert!(json.contains("\"completed\""));

        let deserialized: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, checkpoint);
    }
}
