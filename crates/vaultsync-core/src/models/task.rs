//! Tasks, their checklist items, priority and status

use chrono::Duration;
use std::cmp::Ordering;

use crate::time::{Instant, TimeNormalizer};

/// Four-tier priority derived from the upstream integer (5/3/1/other)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityLevel {
    Urgent,
    High,
    Medium,
    Low,
}

/// Raw upstream priority, kept as-is for front matter and sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Priority(Option<i64>);

impl Priority {
    pub fn new(raw: Option<i64>) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> Option<i64> {
        self.0
    }

    /// Sort key: absent counts as 0
    pub fn rank(&self) -> i64 {
        self.0.unwrap_or(0)
    }

    pub fn level(&self) -> PriorityLevel {
        match self.0 {
            Some(5) => PriorityLevel::Urgent,
            Some(3) => PriorityLevel::High,
            Some(1) => PriorityLevel::Medium,
            _ => PriorityLevel::Low,
        }
    }

    /// Glyph used on every index and summary line
    pub fn glyph(&self) -> &'static str {
        match self.level() {
            PriorityLevel::Urgent => "⏫",
            PriorityLevel::High => "🔼",
            PriorityLevel::Medium => "🔽",
            PriorityLevel::Low => "⏬",
        }
    }
}

/// Task lifecycle status (upstream: 0 = todo, 2 = completed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Todo,
    Completed,
    Other(i64),
}

impl TaskStatus {
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => TaskStatus::Todo,
            2 => TaskStatus::Completed,
            other => TaskStatus::Other(other),
        }
    }

    pub fn raw(&self) -> i64 {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::Completed => 2,
            TaskStatus::Other(raw) => *raw,
        }
    }
}

/// Record kind: to-do entries versus free-form notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Text,
    Checklist,
    Note,
    Other(String),
}

impl TaskKind {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None | Some("TEXT") => TaskKind::Text,
            Some("CHECKLIST") => TaskKind::Checklist,
            Some("NOTE") => TaskKind::Note,
            Some(other) => TaskKind::Other(other.to_string()),
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, TaskKind::Note)
    }
}

/// A checklist entry inside a task
#[derive(Debug, Clone)]
pub struct TaskItem {
    pub title: String,
    pub completed: Option<Instant>,
}

impl TaskItem {
    pub fn is_done(&self) -> bool {
        self.completed.is_some()
    }
}

/// A task or note, with its effective start/due already attached
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub project_id: String,
    pub column_id: Option<String>,
    pub parent_id: Option<String>,
    pub child_ids: Vec<String>,
    pub kind: TaskKind,
    pub priority: Priority,
    pub status: Option<TaskStatus>,
    pub is_all_day: bool,
    /// Effective start instant
    pub start: Option<Instant>,
    /// Effective due instant (all-day ranges already made inclusive)
    pub due: Option<Instant>,
    pub created: Option<Instant>,
    pub modified: Option<Instant>,
    pub completed: Option<Instant>,
    pub content: Option<String>,
    pub desc: Option<String>,
    pub items: Vec<TaskItem>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Some(TaskStatus::Completed)
    }

    pub fn is_todo(&self) -> bool {
        self.status == Some(TaskStatus::Todo)
    }

    pub fn has_children(&self) -> bool {
        !self.child_ids.is_empty()
    }
}

/// Summary ordering: priority descending, then creation ascending
pub fn summary_order(a: &Task, b: &Task) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| a.created.cmp(&b.created))
}

/// Compute the effective (start, due) pair of a task.
///
/// An all-day task stores an exclusive due date, so the effective due is one
/// day earlier, unless start and due are the very same value, which marks a
/// single-day event. A due date that cannot move back a day is absent.
pub fn effective_span(
    normalizer: &TimeNormalizer,
    raw_start: Option<&str>,
    raw_due: Option<&str>,
    is_all_day: bool,
) -> (Option<Instant>, Option<Instant>) {
    let start = normalizer.parse_opt(raw_start);
    let due = normalizer.parse_opt(raw_due).and_then(|due| {
        if is_all_day && raw_start != raw_due {
            due.checked_sub_signed(Duration::days(1))
        } else {
            Some(due)
        }
    });
    (start, due)
}
