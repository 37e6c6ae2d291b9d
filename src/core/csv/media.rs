//! Media resolution
//!
//! Attachments referenced by binary fields are copied from the submission's
//! working directory into the export's media directory. Files with identical
//! content are never copied twice, and a file with the same name but different
//! content gets the lowest free `-<n>` suffix (n >= 2) instead of overwriting.
//! An existing suffixed copy with the same content is reused.

use super::MEDIA_PREFIX;
use crate::domain::Result;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Copies one referenced attachment and returns its CSV value
///
/// The returned value is `media/<file name>` of the resolved destination.
/// A missing source file is not an error: the reference is emitted as if the
/// file had been copied.
pub fn resolve_media(working_dir: &Path, media_dir: &Path, reference: &str) -> Result<String> {
    let Some(file_name) = Path::new(reference).file_name() else {
        return Ok(reference.to_string());
    };
    let file_name = file_name.to_string_lossy().to_string();

    fs::create_dir_all(media_dir)?;

    let source = working_dir.join(&file_name);
    if !source.is_file() {
        tracing::debug!(
            file = %source.display(),
            "Referenced media file is missing, emitting reference without copying"
        );
        return Ok(media_value(&file_name));
    }

    let destination = media_dir.join(&file_name);
    if !destination.exists() {
        fs::copy(&source, &destination)?;
        return Ok(media_value(&file_name));
    }

    let source_checksum = file_checksum(&source)?;
    if file_checksum(&destination)? == source_checksum {
        return Ok(media_value(&file_name));
    }

    let mut sequence = 2;
    loop {
        let candidate = sequential_name(&file_name, sequence);
        let candidate_path = media_dir.join(&candidate);
        if !candidate_path.exists() {
            fs::copy(&source, &candidate_path)?;
            tracing::debug!(
                file = %file_name,
                renamed = %candidate,
                "Media name collision, copied under a sequential name"
            );
            return Ok(media_value(&candidate));
        }
        if file_checksum(&candidate_path)? == source_checksum {
            return Ok(media_value(&candidate));
        }
        sequence += 1;
    }
}

/// `<stem>-<n>.<ext>`, or `<stem>-<n>` without an extension
pub fn sequential_name(file_name: &str, sequence: usize) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, sequence, ext.to_string_lossy()),
        None => format!("{stem}-{sequence}"),
    }
}

/// Hex-encoded SHA-256 of a file's content
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Path of a media file as written into CSV cells
pub fn media_value(file_name: &str) -> String {
    format!("{MEDIA_PREFIX}{file_name}")
}

/// Copies a file into the media directory under a fixed name, replacing any
/// previous copy
pub fn copy_replacing(source: &Path, media_dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(media_dir)?;
    let destination = media_dir.join(file_name);
    fs::copy(source, &destination)?;
    Ok(destination)
}
