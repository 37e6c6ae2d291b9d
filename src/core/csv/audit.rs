//! Audit log resolution
//!
//! A form may attach an audit trail CSV to each submission. The trail is
//! handled two ways: an individual copy per instance in the media directory,
//! and an append into one aggregated audit file shared by the whole run.

use super::media::{copy_replacing, media_value};
use crate::domain::ids::InstanceId;
use crate::domain::{FormcastError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Header line of the aggregated audit file
pub const AUDIT_HEADER: &str = "instance ID, event, node, start, end";

/// File name of the individual audit copy of an instance
pub fn individual_audit_name(instance_id: &InstanceId) -> String {
    format!("audit-{}.csv", instance_id.sanitized())
}

/// Copies an instance's audit file into the media directory
///
/// Any earlier copy for the same instance is replaced. Returns the CSV value
/// of the copy; a missing source still yields the reference.
pub fn copy_individual_audit(
    working_dir: &Path,
    media_dir: &Path,
    reference: &str,
    instance_id: &InstanceId,
) -> Result<String> {
    let name = individual_audit_name(instance_id);
    let source = working_dir.join(reference);
    if source.is_file() {
        copy_replacing(&source, media_dir, &name)?;
    } else {
        tracing::debug!(
            instance_id = %instance_id,
            file = %source.display(),
            "Audit file is missing, emitting reference without copying"
        );
    }
    Ok(media_value(&name))
}

/// Serialized writer of the aggregated audit file
#[derive(Debug)]
pub struct AuditAppender {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditAppender {
    /// Opens the aggregated audit file
    ///
    /// The file is created with its header line when `overwrite` is set or
    /// when it does not exist yet; otherwise new entries are appended.
    pub fn open(path: impl AsRef<Path>, overwrite: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = if overwrite || !path.exists() {
            let mut file = File::create(&path)?;
            writeln!(file, "{AUDIT_HEADER}")?;
            file
        } else {
            OpenOptions::new().append(true).open(&path)?
        };

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the aggregated file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an instance's audit entries, skipping the source header
    pub fn append(&self, instance_id: &InstanceId, audit_file: &Path) -> Result<()> {
        if !audit_file.is_file() {
            tracing::warn!(
                instance_id = %instance_id,
                file = %audit_file.display(),
                "Audit file is missing, nothing appended"
            );
            return Ok(());
        }

        let contents = std::fs::read_to_string(audit_file)?;
        let mut buffer = String::with_capacity(contents.len());
        for line in contents.lines().skip(1).filter(|l| !l.trim().is_empty()) {
            buffer.push_str(instance_id.as_str());
            buffer.push(',');
            buffer.push_str(line);
            buffer.push('\n');
        }

        let mut file = self
            .file
            .lock()
            .map_err(|_| FormcastError::Io("audit file lock poisoned".to_string()))?;
        file.write_all(buffer.as_bytes())?;
        Ok(())
    }
}
