//! Engine configuration and output layout
//!
//! `SyncConfig` is plain data handed to the engine by the caller. Every key
//! has a default, so an empty TOML file is a valid configuration.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::CoreError;
use crate::hierarchy::DuplicatePolicy;
use crate::render::QueryTemplate;
use crate::rewrite::ContentRewriter;
use crate::time::TimeNormalizer;

/// Name of the unified project index inside the inbox directory
pub const INDEX_FILE: &str = "TasksInbox.md";

/// Sub-directory names under the output root
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirNames {
    pub calendar: String,
    pub tasks: String,
    pub inbox: String,
    pub notes: String,
    pub columns: String,
    pub memos: String,
}

impl Default for DirNames {
    fn default() -> Self {
        Self {
            calendar: "Calendar".to_string(),
            tasks: "Tasks".to_string(),
            inbox: "Inbox".to_string(),
            notes: "Notes".to_string(),
            columns: "Columns".to_string(),
            memos: "Memos".to_string(),
        }
    }
}

/// Parameters of the embedded query directives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuerySettings {
    pub view: String,
    pub folder: String,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            view: "dida365TaskTable".to_string(),
            folder: "9.Archive/Dida365/Tasks".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub output_root: PathBuf,
    pub dirs: DirNames,
    /// Suffix of calendar file names
    pub source_label: String,
    /// Suffix of memo file names
    pub memo_label: String,
    pub utc_offset_hours: i32,
    pub attachment_base_url: String,
    pub webapp_host: String,
    pub query: QuerySettings,
    pub inbox_name: String,
    pub memo_limit: usize,
    pub memo_status: String,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            dirs: DirNames::default(),
            source_label: "Dida365".to_string(),
            memo_label: "Memos".to_string(),
            utc_offset_hours: 8,
            attachment_base_url: "https://dida365.com/api/v1/attachment".to_string(),
            webapp_host: "dida365.com".to_string(),
            query: QuerySettings::default(),
            inbox_name: "Inbox".to_string(),
            memo_limit: 10,
            memo_status: "NORMAL".to_string(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        toml::from_str(raw).map_err(|e| CoreError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|e| CoreError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn time_normalizer(&self) -> Result<TimeNormalizer, CoreError> {
        TimeNormalizer::new(self.utc_offset_hours).ok_or_else(|| CoreError::InvalidConfig {
            message: format!(
                "utc_offset_hours must be within -23..=23, got {}",
                self.utc_offset_hours
            ),
        })
    }

    pub fn rewriter(&self) -> Result<ContentRewriter, CoreError> {
        ContentRewriter::new(&self.attachment_base_url, &self.webapp_host)
    }

    pub fn query_template(&self) -> QueryTemplate {
        QueryTemplate::new(&self.query.view, &self.query.folder)
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_root, &self.dirs)
    }
}

/// Resolved output directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub daily: PathBuf,
    pub weekly: PathBuf,
    pub monthly: PathBuf,
    pub tasks: PathBuf,
    pub inbox: PathBuf,
    pub notes: PathBuf,
    pub columns: PathBuf,
    pub memos_daily: PathBuf,
    pub memos_weekly: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path, dirs: &DirNames) -> Self {
        let calendar = root.join(&dirs.calendar);
        let memos = root.join(&dirs.memos);
        Self {
            root: root.to_path_buf(),
            daily: calendar.join("1.Daily"),
            weekly: calendar.join("2.Weekly"),
            monthly: calendar.join("3.Monthly"),
            tasks: root.join(&dirs.tasks),
            inbox: root.join(&dirs.inbox),
            notes: root.join(&dirs.notes),
            columns: root.join(&dirs.columns),
            memos_daily: memos.join("1.Daily"),
            memos_weekly: memos.join("2.Weekly"),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.inbox.join(INDEX_FILE)
    }

    fn areas(&self) -> [&Path; 9] {
        [
            self.daily.as_path(),
            self.weekly.as_path(),
            self.monthly.as_path(),
            self.tasks.as_path(),
            self.inbox.as_path(),
            self.notes.as_path(),
            self.columns.as_path(),
            self.memos_daily.as_path(),
            self.memos_weekly.as_path(),
        ]
    }

    /// Create the output tree.
    ///
    /// A root that cannot be created or written to aborts the run. A
    /// sub-directory that cannot be created is only logged: every document in
    /// it will fail on its own and be reported individually.
    pub fn prepare(&self) -> Result<(), CoreError> {
        if let Err(e) = fs::create_dir_all(&self.root) {
            return Err(CoreError::OutputRootUnavailable {
                path: self.root.clone(),
                reason: e.to_string(),
            });
        }
        if !self.root.is_dir() {
            return Err(CoreError::OutputRootUnavailable {
                path: self.root.clone(),
                reason: "not a directory".to_string(),
            });
        }
        // The scratch file is removed on drop
        if let Err(e) = tempfile::NamedTempFile::new_in(&self.root) {
            return Err(CoreError::OutputRootUnavailable {
                path: self.root.clone(),
                reason: format!("not writable: {e}"),
            });
        }

        for dir in self.areas() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(path = %dir.display(), error = %e, "Failed to create output directory");
            }
        }
        Ok(())
    }
}
