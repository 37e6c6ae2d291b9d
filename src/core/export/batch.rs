//! Per-submission processing and result accumulation
//!
//! [`SubmissionProcessor`] runs on a blocking worker thread for one candidate
//! file: parse, validate, render and (optionally) build GeoJSON features.
//! [`BatchResult`] folds the outcomes of all tasks in completion order.

use super::archive::ErrorArchive;
use super::options::ExportOptions;
use super::summary::ExportError;
use crate::adapters::{SubmissionFile, SubmissionParser};
use crate::core::csv::{LineSet, RowRenderer};
use crate::core::geojson::{build_features, Feature};
use crate::domain::{Result, SubmissionError};
use std::collections::HashMap;
use std::sync::Arc;

/// What happened to one candidate
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Rendered into one line set per destination file
    Rendered {
        index: usize,
        instance_id: String,
        line_sets: HashMap<String, LineSet>,
        features: Vec<Feature>,
    },
    /// Excluded from rendering and archived
    Rejected { index: usize, error: ExportError },
    /// Not started because of a shutdown signal
    Cancelled { index: usize },
}

/// Processes single candidate files
pub struct SubmissionProcessor {
    parser: Arc<dyn SubmissionParser>,
    renderer: Arc<RowRenderer>,
    options: Arc<ExportOptions>,
    archive: Arc<ErrorArchive>,
}

impl SubmissionProcessor {
    pub fn new(
        parser: Arc<dyn SubmissionParser>,
        renderer: Arc<RowRenderer>,
        options: Arc<ExportOptions>,
        archive: Arc<ErrorArchive>,
    ) -> Self {
        Self {
            parser,
            renderer,
            options,
            archive,
        }
    }

    /// Parse, validate and render one candidate
    ///
    /// Parse failures and invalid submissions come back as
    /// [`SubmissionOutcome::Rejected`]; only I/O and merge faults are errors.
    pub fn process(&self, index: usize, file: &SubmissionFile) -> Result<SubmissionOutcome> {
        let parsed = self
            .parser
            .parse(file, self.options.encrypted, self.options.private_key.as_ref())
            .and_then(|submission| {
                submission.validate(self.renderer.schema())?;
                Ok(submission)
            });

        let submission = match parsed {
            Ok(submission) => submission,
            Err(error) => return self.reject(index, file, &error),
        };

        let line_sets = self.renderer.render_submission(&submission)?;
        let features = if self.options.include_geojson {
            build_features(self.renderer.schema(), &submission)
        } else {
            Vec::new()
        };

        tracing::trace!(
            instance_id = %submission.instance_id,
            file = %file.path.display(),
            "Submission rendered"
        );

        Ok(SubmissionOutcome::Rendered {
            index,
            instance_id: submission.instance_id.to_string(),
            line_sets,
            features,
        })
    }

    fn reject(
        &self,
        index: usize,
        file: &SubmissionFile,
        error: &SubmissionError,
    ) -> Result<SubmissionOutcome> {
        // A file that cannot be copied is still skipped, never fatal.
        let archived = match self.archive.archive(&file.path) {
            Ok(path) => path.display().to_string(),
            Err(e) => {
                tracing::warn!(
                    file = %file.path.display(),
                    error = %e,
                    "Failed to archive rejected submission"
                );
                "none".to_string()
            }
        };
        crate::log_submission_skipped!(file.path.display(), error, archived);

        let error = ExportError::from(error).with_context(format!(
            "file={}, archived={}",
            file.path.display(),
            archived
        ));
        Ok(SubmissionOutcome::Rejected { index, error })
    }
}

/// Accumulated results of an export run
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Submissions rendered
    pub exported: usize,
    /// Submissions rejected or cancelled
    pub skipped: usize,
    /// Submissions cancelled by a shutdown signal
    pub cancelled: usize,
    /// Line sets keyed by destination FQN
    pub line_sets: HashMap<String, LineSet>,
    /// Rejection details
    pub errors: Vec<ExportError>,
    features: Vec<(usize, Vec<Feature>)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one task outcome into the result
    ///
    /// # Errors
    ///
    /// Propagates a line set merge contract violation.
    pub fn record(&mut self, outcome: SubmissionOutcome) -> Result<()> {
        match outcome {
            SubmissionOutcome::Rendered {
                index,
                line_sets,
                features,
                ..
            } => {
                self.exported += 1;
                self.merge_line_sets(line_sets)?;
                if !features.is_empty() {
                    self.features.push((index, features));
                }
            }
            SubmissionOutcome::Rejected { error, .. } => {
                self.skipped += 1;
                self.errors.push(error);
            }
            SubmissionOutcome::Cancelled { .. } => {
                self.skipped += 1;
                self.cancelled += 1;
            }
        }
        Ok(())
    }

    fn merge_line_sets(&mut self, line_sets: HashMap<String, LineSet>) -> Result<()> {
        for (fqn, set) in line_sets {
            let merged = match self.line_sets.remove(&fqn) {
                Some(existing) => existing.merge(set)?,
                None => set,
            };
            self.line_sets.insert(fqn, merged);
        }
        Ok(())
    }

    /// Features of all rendered submissions, in candidate order
    pub fn take_features(&mut self) -> Vec<Feature> {
        let mut features = std::mem::take(&mut self.features);
        features.sort_by_key(|(index, _)| *index);
        features.into_iter().flat_map(|(_, f)| f).collect()
    }
}
