//! Idempotent per-document sync
//!
//! Each target file is either absent or present. Absent files are always
//! written. For present files the write policy decides: tracked documents
//! compare their stored `modified_time` marker with the source record,
//! generate-once documents are left alone, and live documents are always
//! replaced. Replacement goes through a temporary file in the target
//! directory followed by a rename.

use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::error::CoreError;
use crate::render::{extract_field, MARKER_KEY};

/// How a present document decides between skip and rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePolicy {
    /// Skip when the stored marker equals the source's formatted
    /// modification instant; a source without one is always rewritten
    Tracked { marker: Option<String> },
    /// Skip whenever the file exists
    Once,
    /// Rewrite on every run
    Always,
}

impl WritePolicy {
    pub fn tracked(marker: Option<String>) -> Self {
        WritePolicy::Tracked { marker }
    }
}

/// What happened to one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Replaced,
    Skipped,
}

/// True when the present file at `path` is already up to date
fn is_current(path: &Path, policy: &WritePolicy) -> bool {
    match policy {
        WritePolicy::Once => true,
        WritePolicy::Always => false,
        WritePolicy::Tracked { marker: None } => false,
        WritePolicy::Tracked {
            marker: Some(marker),
        } => match fs::read_to_string(path) {
            Ok(existing) => extract_field(&existing, MARKER_KEY).as_deref() == Some(marker.as_str()),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Unreadable document, rewriting");
                false
            }
        },
    }
}

/// Synchronize one document.
///
/// `render` is only called when the document is actually written, so a
/// skipped document costs one read at most.
pub fn sync_document(
    path: &Path,
    policy: &WritePolicy,
    render: impl FnOnce() -> String,
) -> Result<SyncOutcome, CoreError> {
    let present = path.is_file();

    if present && is_current(path, policy) {
        debug!(path = %path.display(), "Document up to date, skipping");
        return Ok(SyncOutcome::Skipped);
    }

    atomic_write(path, render().as_bytes())?;

    if present {
        debug!(path = %path.display(), "Document replaced");
        Ok(SyncOutcome::Replaced)
    } else {
        debug!(path = %path.display(), "Document created");
        Ok(SyncOutcome::Created)
    }
}

/// Write `data` to a temporary sibling of `path`, then rename it into place
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), CoreError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| CoreError::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut temp_file =
        tempfile::NamedTempFile::new_in(dir).map_err(|source| CoreError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;

    temp_file
        .write_all(data)
        .and_then(|_| temp_file.flush())
        .map_err(|source| CoreError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;

    temp_file
        .persist(path)
        .map_err(|e| CoreError::FileWrite {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}
