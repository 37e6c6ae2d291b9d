//! Rejected submission archive
//!
//! Submissions excluded from rendering are copied, never moved, into the
//! form's errors directory as `failed_submission_<n>.<ext>` so they can be
//! inspected after the run.

use crate::domain::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const ARCHIVE_PREFIX: &str = "failed_submission_";

/// Copies rejected submission files with sequential names
#[derive(Debug)]
pub struct ErrorArchive {
    dir: PathBuf,
    next: AtomicUsize,
}

impl ErrorArchive {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            next: AtomicUsize::new(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies `source` under the next unused sequence number
    ///
    /// Numbers already taken by earlier runs are skipped.
    pub fn archive(&self, source: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let extension = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        loop {
            let n = self.next.fetch_add(1, Ordering::Relaxed);
            let target = self.dir.join(format!("{ARCHIVE_PREFIX}{n}{extension}"));
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
            {
                Ok(_) => {
                    if let Err(e) = std::fs::copy(source, &target) {
                        let _ = std::fs::remove_file(&target);
                        return Err(e.into());
                    }
                    return Ok(target);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
