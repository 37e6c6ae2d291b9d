//! JSON file checkpoint storage
//!
//! All checkpoints live in one pretty-printed JSON document keyed by form id.
//! The file is rewritten through a temporary sibling and a rename so a crash
//! never leaves a truncated state file behind.

use crate::adapters::traits::CheckpointStorage;
use crate::core::state::Checkpoint;
use crate::domain::ids::FormId;
use crate::domain::{FormcastError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type CheckpointMap = BTreeMap<String, Checkpoint>;

/// Checkpoint storage backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileCheckpointStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    lock: Mutex<()>,
}

impl JsonFileCheckpointStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<CheckpointMap> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(CheckpointMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                FormcastError::State(format!(
                    "Corrupt checkpoint file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CheckpointMap::new()),
            Err(e) => Err(FormcastError::State(format!(
                "Cannot read checkpoint file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_all(&self, checkpoints: &CheckpointMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(checkpoints)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStorage for JsonFileCheckpointStorage {
    async fn load_checkpoint(&self, form_id: &FormId) -> Result<Option<Checkpoint>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(form_id.as_str()))
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut checkpoints = self.read_all().await?;
        checkpoints.insert(checkpoint.form_id.to_string(), checkpoint.clone());
        self.write_all(&checkpoints).await?;

        tracing::debug!(
            form_id = %checkpoint.form_id,
            file = %self.path.display(),
            "Saved checkpoint"
        );
        Ok(())
    }

    async fn get_all_checkpoints(&self) -> Result<Vec<Checkpoint>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{CheckpointBuilder, ExportStatus};
    use std::str::FromStr;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = JsonFileCheckpointStorage::new(dir.path().join("state.json"));
        let form_id = FormId::from_str("household").unwrap();
        assert!(storage.load_checkpoint(&form_id).await.unwrap().is_none());
        assert!(storage.get_all_checkpoints().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs_and_keeps_other_forms() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = JsonFileCheckpointStorage::new(dir.path().join("nested/state/checkpoints.json"));

        let household = CheckpointBuilder::new(FormId::from_str("household").unwrap())
            .submissions_exported_count(3)
            .last_export_status(ExportStatus::Completed)
            .build();
        let clinic = CheckpointBuilder::new(FormId::from_str("clinic").unwrap()).build();
        storage.save_checkpoint(&household).await.unwrap();
        storage.save_checkpoint(&clinic).await.unwrap();

        let loaded = storage
            .load_checkpoint(&household.form_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, household);
        assert_eq!(storage.get_all_checkpoints().await.unwrap().len(), 2);
        assert!(storage.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_state_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        let storage = JsonFileCheckpointStorage::new(&path);
        let err = storage.get_all_checkpoints().await.unwrap_err();
        assert!(matches!(err, FormcastError::State(_)));
    }
}
