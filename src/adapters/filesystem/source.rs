//! Instance directory scanner
//!
//! Submissions are stored one per directory:
//!
//! ```text
//! <storage_dir>/
//!   uuid-0a1b/
//!     submission.xml
//!     photo.jpg
//!   uuid-2c3d/
//!     submission.xml
//! ```

use super::parser::{read_root_attribute, SUBMISSION_DATE_ATTRIBUTE};
use crate::adapters::traits::{DateRange, SubmissionFile, SubmissionSource};
use crate::core::csv::format::parse_datetime;
use crate::domain::{FormcastError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Name of the submission document inside an instance directory
pub const SUBMISSION_FILE_NAME: &str = "submission.xml";

/// Lists submissions from an instances directory
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    storage_dir: PathBuf,
}

impl FileSystemSource {
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            storage_dir: storage_dir.as_ref().to_path_buf(),
        }
    }

    async fn read_submission_date(path: &Path) -> Option<DateTime<Utc>> {
        let xml = match tokio::fs::read_to_string(path).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::debug!(file = %path.display(), error = %e, "Cannot read submission date");
                return None;
            }
        };
        // Unreadable headers are left to the parser, which archives the file.
        read_root_attribute(&xml, SUBMISSION_DATE_ATTRIBUTE)
            .ok()
            .flatten()
            .and_then(|raw| parse_datetime(&raw))
            .map(|date| date.with_timezone(&Utc))
    }
}

#[async_trait]
impl SubmissionSource for FileSystemSource {
    async fn list_submissions(
        &self,
        range: DateRange,
        only_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<SubmissionFile>> {
        let mut entries = tokio::fs::read_dir(&self.storage_dir).await.map_err(|e| {
            FormcastError::Io(format!(
                "Cannot read storage directory {}: {}",
                self.storage_dir.display(),
                e
            ))
        })?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let working_dir = entry.path();
            let path = working_dir.join(SUBMISSION_FILE_NAME);
            if !tokio::fs::try_exists(&path).await? {
                continue;
            }

            let submission_date = Self::read_submission_date(&path).await;
            if !range.contains(submission_date) {
                continue;
            }
            if let Some(checkpoint) = only_after {
                if !submission_date.is_some_and(|date| date > checkpoint) {
                    continue;
                }
            }

            candidates.push(SubmissionFile {
                path,
                working_dir,
                submission_date,
            });
        }

        candidates.sort_by(|a, b| {
            a.submission_date
                .cmp(&b.submission_date)
                .then_with(|| a.path.cmp(&b.path))
        });

        tracing::debug!(
            storage_dir = %self.storage_dir.display(),
            count = candidates.len(),
            "Listed candidate submissions"
        );
        Ok(candidates)
    }
}
