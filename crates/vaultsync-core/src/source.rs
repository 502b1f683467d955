//! Record sources: where the engine gets its data from
//!
//! `RecordSource` is the whole contract with the fetching side. The engine
//! only sees decoded batches, each carrying the `LoadReport` of its decode
//! stage. `SnapshotSource` reads a directory of JSON exports that use the
//! upstream field names.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CoreError, LoadError, LoadReport};
use crate::models::{CheckinMap, Column, Habit, Memo, Project, ProjectKind, Task, TaskKind};
use crate::parsers::RecordDecoder;
use crate::time::TimeNormalizer;

/// Task and note projects with their columns
#[derive(Debug, Default)]
pub struct ProjectBatch {
    /// Task projects, each with its columns in declaration order
    pub projects: Vec<Project>,
    pub note_projects: Vec<Project>,
    pub columns: Vec<Column>,
    /// Id of the account's inbox project, when known
    pub inbox_id: Option<String>,
    pub report: LoadReport,
}

#[derive(Debug, Default)]
pub struct TaskBatch {
    pub todo: Vec<Task>,
    pub completed: Vec<Task>,
    pub notes: Vec<Task>,
    pub report: LoadReport,
}

#[derive(Debug, Default)]
pub struct HabitBatch {
    /// Active habits only
    pub habits: Vec<Habit>,
    pub checkins: CheckinMap,
    pub report: LoadReport,
}

#[derive(Debug, Default)]
pub struct MemoBatch {
    pub memos: Vec<Memo>,
    pub report: LoadReport,
}

/// Supplier of decoded records
pub trait RecordSource {
    fn fetch_projects_and_columns(&self) -> Result<ProjectBatch>;

    fn fetch_tasks(&self) -> Result<TaskBatch>;

    /// Habits plus checkins stamped on or after `day_stamp`
    fn fetch_habits_and_checkins(&self, day_stamp: i64) -> Result<HabitBatch>;

    /// Newest memos with row status `status`, skipping `offset`, at most `limit`
    fn fetch_memos(&self, limit: usize, offset: usize, status: &str) -> Result<MemoBatch>;
}

/// Hand each column to the task project that owns it, keeping source order
pub fn attach_columns(projects: &mut [Project], columns: &[Column]) {
    for project in projects.iter_mut() {
        project.columns = columns
            .iter()
            .filter(|c| c.project_id == project.id)
            .cloned()
            .collect();
    }
}

/// Snapshot file names
pub mod files {
    pub const PROFILE: &str = "profile.json";
    pub const PROJECTS: &str = "projects.json";
    pub const COLUMNS: &str = "columns.json";
    pub const TASKS: &str = "tasks.json";
    pub const COMPLETED: &str = "completed.json";
    pub const HABITS: &str = "habits.json";
    pub const CHECKINS: &str = "checkins.json";
    pub const MEMOS: &str = "memos.json";
}

/// Reads records from a directory of JSON exports
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    dir: PathBuf,
    decoder: RecordDecoder,
}

impl SnapshotSource {
    pub fn new(dir: impl Into<PathBuf>, time: TimeNormalizer) -> Self {
        Self {
            dir: dir.into(),
            decoder: RecordDecoder::new(time),
        }
    }

    /// Read one snapshot file. A missing file is a warning, an unreadable or
    /// malformed one an error; both yield `None`.
    fn read_file(&self, name: &str, report: &mut LoadReport) -> Option<Value> {
        let path = self.dir.join(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Snapshot file not found");
                report.add_warning(name, "File not found");
                return None;
            }
            Err(source) => {
                let error = CoreError::FileRead { path, source };
                report.add_error(LoadError::from_core_error(name, &error));
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                let error = CoreError::JsonParse {
                    message: source.to_string(),
                    path,
                    source,
                };
                report.add_error(LoadError::from_core_error(name, &error));
                None
            }
        }
    }

    /// Read a file holding a top-level array
    fn read_array(&self, name: &str, report: &mut LoadReport) -> Vec<Value> {
        match self.read_file(name, report) {
            Some(Value::Array(values)) => values,
            Some(_) => {
                report.add_error(LoadError::error(name, "Expected a JSON array"));
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn read_inbox_id(&self, report: &mut LoadReport) -> Option<String> {
        let profile = self.read_file(files::PROFILE, report)?;
        profile
            .get("inboxId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    /// `{"checkins": {"<habit-id>": [...]}}` or the bare inner map
    fn read_checkins(&self, report: &mut LoadReport) -> HashMap<String, Vec<Value>> {
        let Some(value) = self.read_file(files::CHECKINS, report) else {
            return HashMap::new();
        };
        let inner = value.get("checkins").cloned().unwrap_or(value);

        match serde_json::from_value(inner) {
            Ok(grouped) => grouped,
            Err(e) => {
                report.add_error(LoadError::error(
                    files::CHECKINS,
                    format!("Expected checkins grouped by habit id: {e}"),
                ));
                HashMap::new()
            }
        }
    }
}

impl RecordSource for SnapshotSource {
    fn fetch_projects_and_columns(&self) -> Result<ProjectBatch> {
        let mut report = LoadReport::new();
        let inbox_id = self.read_inbox_id(&mut report);

        let raw_projects = self.read_array(files::PROJECTS, &mut report);
        let raw_columns = self.read_array(files::COLUMNS, &mut report);
        let projects = self.decoder.projects(&raw_projects, &mut report);
        let columns = self.decoder.columns(&raw_columns, &mut report);

        let mut task_projects = Vec::new();
        let mut note_projects = Vec::new();
        for project in projects {
            match project.kind {
                ProjectKind::Task => task_projects.push(project),
                ProjectKind::Note => note_projects.push(project),
                ProjectKind::Other(ref kind) => {
                    debug!(project_id = %project.id, kind = %kind, "Ignoring project kind")
                }
            }
        }
        attach_columns(&mut task_projects, &columns);

        info!(
            projects = task_projects.len(),
            note_projects = note_projects.len(),
            columns = columns.len(),
            "Loaded projects"
        );
        Ok(ProjectBatch {
            projects: task_projects,
            note_projects,
            columns,
            inbox_id,
            report,
        })
    }

    fn fetch_tasks(&self) -> Result<TaskBatch> {
        let mut report = LoadReport::new();
        let raw_tasks = self.read_array(files::TASKS, &mut report);
        let raw_completed = self.read_array(files::COMPLETED, &mut report);

        let mut todo = Vec::new();
        let mut notes = Vec::new();
        for task in self.decoder.tasks(&raw_tasks, &mut report) {
            match task.kind {
                TaskKind::Text | TaskKind::Checklist => todo.push(task),
                TaskKind::Note => notes.push(task),
                TaskKind::Other(ref kind) => {
                    debug!(task_id = %task.id, kind = %kind, "Ignoring task kind")
                }
            }
        }
        let completed = self.decoder.tasks(&raw_completed, &mut report);

        info!(
            todo = todo.len(),
            completed = completed.len(),
            notes = notes.len(),
            "Loaded tasks"
        );
        Ok(TaskBatch {
            todo,
            completed,
            notes,
            report,
        })
    }

    fn fetch_habits_and_checkins(&self, day_stamp: i64) -> Result<HabitBatch> {
        let mut report = LoadReport::new();
        let raw_habits = self.read_array(files::HABITS, &mut report);
        let habits: Vec<Habit> = self
            .decoder
            .habits(&raw_habits, &mut report)
            .into_iter()
            .filter(|h| h.active)
            .collect();

        let grouped = self.read_checkins(&mut report);
        let mut checkins = self.decoder.checkins(&grouped, &mut report);
        for list in checkins.values_mut() {
            list.retain(|c| c.stamp >= day_stamp);
        }

        Ok(HabitBatch {
            habits,
            checkins,
            report,
        })
    }

    fn fetch_memos(&self, limit: usize, offset: usize, status: &str) -> Result<MemoBatch> {
        let mut report = LoadReport::new();
        let raw = self.read_array(files::MEMOS, &mut report);

        let mut memos: Vec<Memo> = self
            .decoder
            .memos(&raw, &mut report)
            .into_iter()
            .filter(|m| m.row_status.as_deref().map_or(true, |s| s == status))
            .collect();
        memos.sort_by(|a, b| b.created_ts.cmp(&a.created_ts));
        let memos = memos.into_iter().skip(offset).take(limit).collect();

        Ok(MemoBatch { memos, report })
    }
}

/// Load a snapshot source directory, failing early when it does not exist
pub fn open_snapshot(dir: &Path, time: TimeNormalizer) -> Result<SnapshotSource> {
    let meta = fs::metadata(dir)
        .with_context(|| format!("Failed to open snapshot directory: {}", dir.display()))?;
    anyhow::ensure!(
        meta.is_dir(),
        "Snapshot path is not a directory: {}",
        dir.display()
    );
    Ok(SnapshotSource::new(dir, time))
}
