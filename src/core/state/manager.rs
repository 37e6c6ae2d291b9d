//! State manager for checkpoint persistence
//!
//! This module provides the StateManager for loading and saving checkpoints
//! through a [`CheckpointStorage`] backend.

use crate::adapters::CheckpointStorage;
use crate::core::state::checkpoint::{Checkpoint, CheckpointBuilder};
use crate::domain::ids::FormId;
use crate::domain::Result;
use std::sync::Arc;

/// State manager for checkpoint persistence
pub struct StateManager {
    /// State storage backend
    storage: Arc<dyn CheckpointStorage>,
}

impl StateManager {
    /// Create a new StateManager with a storage backend
    pub fn new_with_storage(storage: Arc<dyn CheckpointStorage>) -> Self {
        Self { storage }
    }

    /// Load the checkpoint of a form
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(Checkpoint))` if found, `Ok(None)` if not found, or an error.
    pub async fn load_checkpoint(&self, form_id: &FormId) -> Result<Option<Checkpoint>> {
        self.storage.load_checkpoint(form_id).await
    }

    /// Load the checkpoint of a form, or start a fresh one
    pub async fn load_or_create(&self, form_id: &FormId) -> Result<Checkpoint> {
        match self.load_checkpoint(form_id).await? {
            Some(checkpoint) => {
                tracing::debug!(
                    form_id = %form_id,
                    last_exported = ?checkpoint.last_exported_timestamp,
                    "Loaded existing checkpoint"
                );
                Ok(checkpoint)
            }
            None => {
                tracing::debug!(form_id = %form_id, "No checkpoint found");
                Ok(CheckpointBuilder::new(form_id.clone()).build())
            }
        }
    }

    /// Save a checkpoint
    pub async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.storage.save_checkpoint(checkpoint).await
    }

    /// Get all stored checkpoints
    pub async fn get_all_checkpoints(&self) -> Result<Vec<Checkpoint>> {
        self.storage.get_all_checkpoints().await
    }

    /// Persist the checkpoint at the end of a run
    ///
    /// Same as `save_checkpoint`, with the outcome logged.
    pub async fn persist(&self, checkpoint: &Checkpoint) -> Result<()> {
        tracing::info!(
            form_id = %checkpoint.form_id,
            last_exported = ?checkpoint.last_exported_timestamp,
            submissions_count = checkpoint.submissions_exported_count,
            status = ?checkpoint.last_export_status,
            "Persisting export checkpoint"
        );

        self.save_checkpoint(checkpoint).await
    }
}
