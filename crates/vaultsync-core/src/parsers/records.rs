//! Schema-validated decoding of upstream records
//!
//! Each record is decoded on its own from a `serde_json::Value` into a wire
//! struct mirroring the upstream field names, then validated into a model.
//! A record that fails either step is rejected into the `LoadReport` and the
//! rest of the batch carries on.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{CoreError, LoadReport};
use crate::models::{
    CheckinMap, Column, Habit, HabitCheckin, Memo, MemoResource, Priority, Project, ProjectKind,
    Task, TaskItem, TaskKind, TaskStatus,
};
use crate::models::task::effective_span;
use crate::time::TimeNormalizer;

/// Habit status marking an active (not archived) habit
const HABIT_ACTIVE: i64 = 0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    id: Option<String>,
    name: Option<String>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawColumn {
    id: Option<String>,
    project_id: Option<String>,
    name: Option<String>,
    created_time: Option<String>,
    modified_time: Option<String>,
    sort_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTaskItem {
    title: Option<String>,
    completed_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    id: Option<String>,
    title: Option<String>,
    project_id: Option<String>,
    column_id: Option<String>,
    parent_id: Option<String>,
    #[serde(default)]
    child_ids: Vec<String>,
    kind: Option<String>,
    priority: Option<i64>,
    status: Option<i64>,
    start_date: Option<String>,
    due_date: Option<String>,
    is_all_day: Option<bool>,
    created_time: Option<String>,
    modified_time: Option<String>,
    completed_time: Option<String>,
    content: Option<String>,
    desc: Option<String>,
    #[serde(default)]
    items: Vec<RawTaskItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHabit {
    id: Option<String>,
    name: Option<String>,
    status: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCheckin {
    checkin_stamp: Option<i64>,
    status: Option<i64>,
    checkin_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMemoResource {
    filename: Option<String>,
    name: Option<String>,
    external_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMemo {
    content: Option<String>,
    created_ts: Option<i64>,
    row_status: Option<String>,
    #[serde(default)]
    resource_list: Vec<RawMemoResource>,
}

/// Validate an id that names an output file
fn require_id(kind: &'static str, index: usize, id: Option<String>) -> Result<String, CoreError> {
    let id = id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(CoreError::MissingId { kind, index })?;

    if id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(CoreError::InvalidId { kind, index, id });
    }
    Ok(id)
}

/// Empty strings upstream mean "not set"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decode every value of a batch, rejecting failures individually
fn decode_batch<W, T>(
    kind: &'static str,
    values: &[Value],
    report: &mut LoadReport,
    mut convert: impl FnMut(usize, W) -> Result<T, CoreError>,
) -> Vec<T>
where
    W: DeserializeOwned,
{
    let mut decoded = Vec::with_capacity(values.len());

    for (index, value) in values.iter().enumerate() {
        let result = W::deserialize(value)
            .map_err(|e| CoreError::RecordDecode {
                kind,
                index,
                message: e.to_string(),
            })
            .and_then(|wire| convert(index, wire));

        match result {
            Ok(record) => decoded.push(record),
            Err(error) => {
                debug!(kind, index, error = %error, "Rejected record");
                report.reject(kind, &error);
            }
        }
    }

    report.records_decoded += decoded.len();
    decoded
}

/// Turns raw JSON values into validated models
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordDecoder {
    time: TimeNormalizer,
}

impl RecordDecoder {
    pub fn new(time: TimeNormalizer) -> Self {
        Self { time }
    }

    pub fn projects(&self, values: &[Value], report: &mut LoadReport) -> Vec<Project> {
        decode_batch("project", values, report, |index, raw: RawProject| {
            Ok(Project {
                id: require_id("project", index, raw.id)?,
                name: raw.name.unwrap_or_default(),
                kind: ProjectKind::from_raw(raw.kind.as_deref()),
                columns: Vec::new(),
            })
        })
    }

    pub fn columns(&self, values: &[Value], report: &mut LoadReport) -> Vec<Column> {
        decode_batch("column", values, report, |index, raw: RawColumn| {
            Ok(Column {
                id: require_id("column", index, raw.id)?,
                name: raw.name.unwrap_or_default(),
                project_id: raw.project_id.unwrap_or_default(),
                created: self.time.parse_opt(raw.created_time.as_deref()),
                modified: self.time.parse_opt(raw.modified_time.as_deref()),
                sort_order: raw.sort_order,
            })
        })
    }

    /// Decode tasks and attach their effective start/due instants
    pub fn tasks(&self, values: &[Value], report: &mut LoadReport) -> Vec<Task> {
        decode_batch("task", values, report, |index, raw: RawTask| {
            let id = require_id("task", index, raw.id)?;
            let is_all_day = raw.is_all_day.unwrap_or(false);
            let (start, due) = effective_span(
                &self.time,
                raw.start_date.as_deref(),
                raw.due_date.as_deref(),
                is_all_day,
            );

            let items = raw
                .items
                .into_iter()
                .map(|item| TaskItem {
                    title: item.title.unwrap_or_default(),
                    completed: self.time.parse_opt(item.completed_time.as_deref()),
                })
                .collect();

            Ok(Task {
                id,
                title: raw.title.unwrap_or_default(),
                project_id: raw.project_id.unwrap_or_default(),
                column_id: non_empty(raw.column_id),
                parent_id: non_empty(raw.parent_id),
                child_ids: raw.child_ids,
                kind: TaskKind::from_raw(raw.kind.as_deref()),
                priority: Priority::new(raw.priority),
                status: raw.status.map(TaskStatus::from_raw),
                is_all_day,
                start,
                due,
                created: self.time.parse_opt(raw.created_time.as_deref()),
                modified: self.time.parse_opt(raw.modified_time.as_deref()),
                completed: self.time.parse_opt(raw.completed_time.as_deref()),
                content: non_empty(raw.content),
                desc: non_empty(raw.desc),
                items,
            })
        })
    }

    pub fn habits(&self, values: &[Value], report: &mut LoadReport) -> Vec<Habit> {
        decode_batch("habit", values, report, |index, raw: RawHabit| {
            Ok(Habit {
                id: require_id("habit", index, raw.id)?,
                name: raw.name.unwrap_or_default(),
                active: raw.status == Some(HABIT_ACTIVE),
            })
        })
    }

    /// Decode checkins grouped by habit id
    pub fn checkins(
        &self,
        grouped: &HashMap<String, Vec<Value>>,
        report: &mut LoadReport,
    ) -> CheckinMap {
        let mut map = CheckinMap::new();
        for (habit_id, values) in grouped {
            let checkins = decode_batch("checkin", values, report, |_, raw: RawCheckin| {
                Ok(HabitCheckin {
                    stamp: raw.checkin_stamp.unwrap_or_default(),
                    status: raw.status,
                    checked_at: self.time.parse_opt(raw.checkin_time.as_deref()),
                })
            });
            map.insert(habit_id.clone(), checkins);
        }
        map
    }

    /// Decode memos; the creation epoch identifies a memo
    pub fn memos(&self, values: &[Value], report: &mut LoadReport) -> Vec<Memo> {
        decode_batch("memo", values, report, |index, raw: RawMemo| {
            let created_ts = raw
                .created_ts
                .ok_or(CoreError::MissingId { kind: "memo", index })?;
            let created = self.time.at_epoch(created_ts).ok_or_else(|| {
                CoreError::RecordDecode {
                    kind: "memo",
                    index,
                    message: format!("creation epoch {created_ts} is out of range"),
                }
            })?;

            let resources = raw
                .resource_list
                .into_iter()
                .map(|r| MemoResource {
                    filename: r.filename.or(r.name).unwrap_or_default(),
                    external_link: non_empty(r.external_link),
                })
                .collect();

            Ok(Memo {
                content: raw.content.unwrap_or_default(),
                created_ts,
                created,
                row_status: raw.row_status,
                resources,
            })
        })
    }
}
