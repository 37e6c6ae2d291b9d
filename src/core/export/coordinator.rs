//! Export coordinator - main orchestrator for the export process
//!
//! One run goes through three phases:
//!
//! 1. **Parsing**: list candidates (date range, optional checkpoint), then
//!    parse and validate each one. Rejected files are archived.
//! 2. **Rendering**: every valid submission is rendered into per-file line
//!    sets, folded with the associative line set merge.
//! 3. **Writing**: once every task has finished, the main file is written in
//!    submission date order, repeat files in processing order, and the
//!    checkpoint moves to the newest exported submission.
//!
//! Parsing and rendering of one submission happen in the same blocking task;
//! up to `parallelism` tasks run at once.

use super::archive::ErrorArchive;
use super::batch::{BatchResult, SubmissionOutcome, SubmissionProcessor};
use super::options::ExportOptions;
use super::summary::ExportSummary;
use crate::adapters::filesystem::{FileSystemSource, JsonFileCheckpointStorage, XmlSubmissionParser};
use crate::adapters::{SubmissionParser, SubmissionSource};
use crate::config::FormcastConfig;
use crate::core::csv::{write_csv, AuditAppender, LineSet, RowRenderer};
use crate::core::geojson::write_geojson;
use crate::core::state::{Checkpoint, StateManager};
use crate::domain::{FormDefinition, FormSchema, FormcastError, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Export coordinator
pub struct ExportCoordinator {
    options: Arc<ExportOptions>,
    schema: Arc<FormSchema>,
    source: Arc<dyn SubmissionSource>,
    parser: Arc<dyn SubmissionParser>,
    state_manager: Arc<StateManager>,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a coordinator wired to the filesystem collaborators
    ///
    /// Loads the form definition named by `form.definition`.
    pub async fn new(config: FormcastConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        config.validate().map_err(FormcastError::Configuration)?;

        let schema = FormDefinition::load(&config.form.definition)?.into_schema()?;
        let options = ExportOptions::from_config(&config)?;
        let source = FileSystemSource::new(&config.form.storage_dir);
        let storage = JsonFileCheckpointStorage::new(config.checkpoint_file());

        tracing::debug!(
            form_id = %options.form_id,
            definition = %config.form.definition,
            fields = schema.len(),
            storage_dir = %config.form.storage_dir,
            "Export coordinator configured"
        );

        Ok(Self::with_collaborators(
            options,
            schema,
            Arc::new(source),
            Arc::new(XmlSubmissionParser::new()),
            Arc::new(StateManager::new_with_storage(Arc::new(storage))),
            shutdown_signal,
        ))
    }

    /// Create a coordinator from explicit collaborators
    pub fn with_collaborators(
        options: ExportOptions,
        schema: FormSchema,
        source: Arc<dyn SubmissionSource>,
        parser: Arc<dyn SubmissionParser>,
        state_manager: Arc<StateManager>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            options: Arc::new(options),
            schema: Arc::new(schema),
            source,
            parser,
            state_manager,
            shutdown_signal,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Execute the export
    ///
    /// Rejected submissions never fail the run; they are counted as skipped
    /// and archived. Output I/O faults and checkpoint failures are returned
    /// as errors after the checkpoint is marked failed.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let form_id = &self.options.form_id;

        let mut checkpoint = self.state_manager.load_or_create(form_id).await?;
        checkpoint.mark_started();
        self.state_manager.save_checkpoint(&checkpoint).await?;

        match self.run(&mut checkpoint).await {
            Ok(summary) => {
                let summary = summary.with_duration(start_time.elapsed());
                if summary.interrupted {
                    checkpoint.mark_interrupted();
                } else {
                    checkpoint.mark_completed();
                }
                self.state_manager.persist(&checkpoint).await?;

                summary.log_summary();
                crate::log_export_complete!(summary.exported, summary.duration);
                Ok(summary)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Export run failed");
                checkpoint.mark_failed();
                if let Err(state_error) = self.state_manager.persist(&checkpoint).await {
                    tracing::error!(error = %state_error, "Failed to persist failed checkpoint");
                }
                Err(e)
            }
        }
    }

    async fn run(&self, checkpoint: &mut Checkpoint) -> Result<ExportSummary> {
        let mut summary = ExportSummary::new();

        // Parsing
        let only_after = if self.options.smart_append {
            checkpoint.last_exported_timestamp
        } else {
            None
        };
        let candidates = self
            .source
            .list_submissions(self.options.date_range(), only_after)
            .await?;
        summary.candidates = candidates.len();
        crate::log_export_start!(self.options.form_id, candidates.len());

        let audit = if self.schema.has_audit() {
            Some(Arc::new(AuditAppender::open(
                self.options.audit_file(),
                self.options.overwrite_files,
            )?))
        } else {
            None
        };
        let renderer = Arc::new(RowRenderer::new(
            self.schema.clone(),
            self.options.clone(),
            audit,
        ));
        let processor = Arc::new(SubmissionProcessor::new(
            self.parser.clone(),
            renderer.clone(),
            self.options.clone(),
            Arc::new(ErrorArchive::new(self.options.errors_dir())),
        ));

        // Rendering
        let mut result = BatchResult::new();
        let mut tasks = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, file)| {
                let processor = processor.clone();
                let shutdown = self.shutdown_signal.clone();
                async move {
                    if *shutdown.borrow() {
                        tracing::debug!(file = %file.path.display(), "Shutdown requested, submission not processed");
                        return Ok::<_, FormcastError>(SubmissionOutcome::Cancelled { index });
                    }
                    tokio::task::spawn_blocking(move || processor.process(index, &file))
                        .await
                        .map_err(|e| FormcastError::Export(format!("Submission task failed: {e}")))?
                }
            })
            .buffer_unordered(self.options.parallelism.max(1));

        while let Some(outcome) = tasks.next().await {
            result.record(outcome?)?;
        }

        summary.exported = result.exported;
        summary.skipped = result.skipped;
        summary.cancelled = result.cancelled;
        summary.interrupted = result.cancelled > 0;
        summary.errors = std::mem::take(&mut result.errors);

        // Writing
        self.write_outputs(&renderer, &mut result, &mut summary).await?;

        let main_set = result.line_sets.get(&renderer.main_fqn());
        if let Some(last) = main_set.and_then(LineSet::last_line) {
            checkpoint.update_after_export(
                Some(last.instance_id.clone()),
                last.submission_date,
                summary.exported as u64,
            );
        } else {
            checkpoint.update_after_export(None, None, summary.exported as u64);
        }

        Ok(summary)
    }

    async fn write_outputs(
        &self,
        renderer: &RowRenderer,
        result: &mut BatchResult,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        let overwrite = self.options.overwrite_files;

        let main_file = self.options.main_file();
        let main_lines = result
            .line_sets
            .get(&renderer.main_fqn())
            .map(LineSet::sorted)
            .unwrap_or_default();
        let rows = write_csv(&main_file, &renderer.main_header()?, main_lines, overwrite).await?;
        summary.add_file(main_file, rows);

        for group in self.schema.repeat_groups() {
            let fqn = self.schema.fqn(group);
            let path = self.options.repeat_file(&fqn);
            let lines = result
                .line_sets
                .get(&fqn)
                .map(LineSet::unsorted)
                .unwrap_or_default();
            let rows = write_csv(&path, &renderer.repeat_header(group)?, lines, overwrite).await?;
            summary.add_file(path, rows);
        }

        if self.options.include_geojson {
            let path = self.options.geojson_file();
            let features = write_geojson(&path, result.take_features()).await?;
            summary.add_file(path, features);
        }

        Ok(())
    }
}
