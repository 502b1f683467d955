//! Removal of file-sync conflict copies from the output tree

use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Marker the file synchronizer puts into conflict copy names
pub const CONFLICT_MARKER: &str = "sync-conflict";

/// Version archive directory, never touched
const VERSIONS_DIR: &str = ".stversions";

fn is_versions_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == VERSIONS_DIR
}

/// Delete every file under `root` whose name contains the conflict marker.
///
/// Returns the number of files removed. Failures are logged and skipped.
pub fn remove_conflict_files(root: &Path) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_versions_dir(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_conflict = entry
            .file_name()
            .to_str()
            .map(|name| name.contains(CONFLICT_MARKER))
            .unwrap_or(false);
        if !is_conflict {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed conflict file");
                removed += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove conflict file"),
        }
    }

    removed
}
