//! Export pipeline: fetched records in, vault documents out
//!
//! A run reads every record into a `Snapshot` before producing output, then
//! walks projects, columns and tasks in a fixed order. Each document is
//! synchronized independently and its outcome folded into a `SyncReport`.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{OutputLayout, SyncConfig};
use crate::error::{CoreError, LoadReport, SyncReport};
use crate::hierarchy::{group_by_columns, project_tasks, TaskIndex};
use crate::models::{CheckinMap, Column, Habit, Memo, Project, Task};
use crate::period::Period;
use crate::render::{
    render_column_note, render_daily_memos, render_daily_summary, render_monthly_summary,
    render_project_index, render_task_note, render_weekly_memos, render_weekly_summary,
    DailyHabits, QueryTemplate,
};
use crate::rewrite::ContentRewriter;
use crate::source::{attach_columns, RecordSource};
use crate::sync::{sync_document, WritePolicy};
use crate::time::{format_date, format_datetime, Instant, TimeNormalizer, MONTH_LAYOUT};

/// Every record one run works from
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Task projects, inbox first when known
    pub projects: Vec<Project>,
    pub note_projects: Vec<Project>,
    pub columns: Vec<Column>,
    pub todo: Vec<Task>,
    pub completed: Vec<Task>,
    pub notes: Vec<Task>,
    pub habits: Vec<Habit>,
    pub checkins: CheckinMap,
    pub memos: Vec<Memo>,
    pub report: LoadReport,
}

impl Snapshot {
    /// Fetch everything from `source` for a run on `today`
    pub fn collect(
        source: &dyn RecordSource,
        config: &SyncConfig,
        time: &TimeNormalizer,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut report = LoadReport::new();
        let day_stamp = time
            .day_stamp(today)
            .with_context(|| format!("Run date {today} is outside the supported calendar range"))?;

        let projects = source
            .fetch_projects_and_columns()
            .context("Failed to fetch projects and columns")?;
        let tasks = source.fetch_tasks().context("Failed to fetch tasks")?;
        let habits = source
            .fetch_habits_and_checkins(day_stamp)
            .context("Failed to fetch habits")?;
        let memos = source
            .fetch_memos(config.memo_limit, 0, &config.memo_status)
            .context("Failed to fetch memos")?;

        report.merge(projects.report);
        report.merge(tasks.report);
        report.merge(habits.report);
        report.merge(memos.report);

        let mut task_projects = projects.projects;
        if let Some(inbox_id) = projects.inbox_id {
            if !task_projects.iter().any(|p| p.id == inbox_id) {
                let mut inbox = Project::inbox(inbox_id, &config.inbox_name);
                attach_columns(std::slice::from_mut(&mut inbox), &projects.columns);
                task_projects.insert(0, inbox);
            }
        }

        Ok(Self {
            projects: task_projects,
            note_projects: projects.note_projects,
            columns: projects.columns,
            todo: tasks.todo,
            completed: tasks.completed,
            notes: tasks.notes,
            habits: habits.habits,
            checkins: habits.checkins,
            memos: memos.memos,
            report,
        })
    }
}

/// Renders and synchronizes every document kind of one run
pub struct Exporter<'a> {
    snapshot: &'a Snapshot,
    config: &'a SyncConfig,
    layout: OutputLayout,
    time: TimeNormalizer,
    rewriter: ContentRewriter,
    query: QueryTemplate,
    today: NaiveDate,
    now: Instant,
}

impl<'a> Exporter<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        config: &'a SyncConfig,
        today: NaiveDate,
        now: Instant,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            snapshot,
            config,
            layout: config.layout(),
            time: config.time_normalizer()?,
            rewriter: config.rewriter()?,
            query: config.query_template(),
            today,
            now,
        })
    }

    fn sync(
        &self,
        report: &mut SyncReport,
        path: PathBuf,
        policy: WritePolicy,
        render: impl FnOnce() -> String,
    ) {
        let document = path
            .strip_prefix(&self.layout.root)
            .unwrap_or(&path)
            .display()
            .to_string();
        report.record(document, sync_document(&path, &policy, render));
    }

    fn tracked(task: &Task) -> WritePolicy {
        WritePolicy::tracked(task.modified.as_ref().map(format_datetime))
    }

    fn sync_task(&self, report: &mut SyncReport, dir: &Path, task: &Task, index: &TaskIndex<'_>) {
        self.sync(
            report,
            dir.join(format!("{}.md", task.id)),
            Self::tracked(task),
            || render_task_note(task, index, &self.rewriter, &self.query),
        );
    }

    /// Task ids in run order: project, column, task; then the rest of the
    /// todo set; then completed tasks
    fn task_order(&self) -> Vec<&'a str> {
        let snapshot = self.snapshot;
        let mut order: Vec<&'a str> = Vec::new();

        for project in &snapshot.projects {
            let tasks = project_tasks(&project.id, &snapshot.todo);
            let groups = group_by_columns(project, &tasks);
            order.extend(groups.unassigned.iter().map(|t| t.id.as_str()));
            for group in &groups.columns {
                order.extend(group.tasks.iter().map(|t| t.id.as_str()));
            }
        }
        order.extend(snapshot.todo.iter().map(|t| t.id.as_str()));
        order.extend(snapshot.completed.iter().map(|t| t.id.as_str()));

        let mut seen = HashSet::new();
        order.retain(|id| seen.insert(*id));
        order
    }

    /// One document per task id; duplicate ids resolve through the index
    pub fn export_tasks(&self, index: &TaskIndex<'_>, report: &mut SyncReport) {
        for id in self.task_order() {
            if let Some(task) = index.get(id) {
                self.sync_task(report, &self.layout.tasks, task, index);
            }
        }
    }

    pub fn export_notes(&self, index: &TaskIndex<'_>, report: &mut SyncReport) {
        for note in &self.snapshot.notes {
            self.sync_task(report, &self.layout.notes, note, index);
        }
    }

    pub fn export_columns(&self, report: &mut SyncReport) {
        for column in &self.snapshot.columns {
            let project = self
                .snapshot
                .projects
                .iter()
                .chain(&self.snapshot.note_projects)
                .find(|p| p.id == column.project_id);
            self.sync(
                report,
                self.layout.columns.join(format!("{}.md", column.id)),
                WritePolicy::Once,
                || render_column_note(column, project, &self.query),
            );
        }
    }

    pub fn export_project_index(&self, report: &mut SyncReport) {
        self.sync(
            report,
            self.layout.index_path(),
            WritePolicy::Always,
            || render_project_index(&self.snapshot.projects, &self.snapshot.todo, &self.now),
        );
    }

    pub fn export_daily_summary(&self, index: &TaskIndex<'_>, report: &mut SyncReport) {
        let Some(day) = Period::day(&self.time, self.today) else {
            return;
        };
        let candidates: Vec<&Task> = self
            .task_order()
            .into_iter()
            .filter_map(|id| index.get(id))
            .collect();
        let habits = DailyHabits {
            habits: &self.snapshot.habits,
            checkins: &self.snapshot.checkins,
            day_stamp: day.start.timestamp(),
        };

        let name = format!("{}-{}.md", day.label(), self.config.source_label);
        self.sync(report, self.layout.daily.join(name), WritePolicy::Always, || {
            render_daily_summary(&day, &candidates, Some(&habits), &self.now)
        });
    }

    pub fn export_weekly_summary(&self, report: &mut SyncReport) {
        let Some(week) = Period::iso_week(&self.time, self.today) else {
            return;
        };
        let iso = self.today.iso_week();
        let name = format!(
            "{}-W{}-{}.md",
            iso.year(),
            iso.week(),
            self.config.source_label
        );
        self.sync(report, self.layout.weekly.join(name), WritePolicy::Once, || {
            render_weekly_summary(&week, &self.query, &self.now)
        });
    }

    pub fn export_monthly_summary(&self, report: &mut SyncReport) {
        let Some(month) = Period::month_of(&self.time, self.today) else {
            return;
        };
        let name = format!(
            "{}-{}.md",
            month.start.format(MONTH_LAYOUT),
            self.config.source_label
        );
        self.sync(report, self.layout.monthly.join(name), WritePolicy::Once, || {
            render_monthly_summary(&month, &self.query, &self.now)
        });
    }

    pub fn export_memos(&self, report: &mut SyncReport) {
        let memos = &self.snapshot.memos;
        let label = &self.config.memo_label;

        if let Some(day) = Period::day(&self.time, self.today) {
            self.sync(
                report,
                self.layout.memos_daily.join(format!("{}-{}.md", day.label(), label)),
                WritePolicy::Always,
                || render_daily_memos(&day, memos, &self.now),
            );
        }

        if let Some(week) = Period::iso_week(&self.time, self.today) {
            let monday = format_date(&week.start);
            self.sync(
                report,
                self.layout.memos_weekly.join(format!("{monday}-Week-{label}.md")),
                WritePolicy::Always,
                || render_weekly_memos(&week, memos, &self.now),
            );
        }
    }

    /// Synchronize every document kind
    pub fn run(&self) -> SyncReport {
        let snapshot = self.snapshot;
        let index = TaskIndex::build(
            &snapshot.todo,
            &snapshot.completed,
            self.config.duplicate_policy,
        );
        debug!(tasks = index.len(), "Built task index");

        let mut report = SyncReport::new();
        self.export_tasks(&index, &mut report);
        self.export_notes(&index, &mut report);
        self.export_columns(&mut report);
        self.export_project_index(&mut report);
        self.export_daily_summary(&index, &mut report);
        self.export_weekly_summary(&mut report);
        self.export_monthly_summary(&mut report);
        self.export_memos(&mut report);

        info!(
            created = report.created,
            replaced = report.replaced,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Sync finished"
        );
        report
    }
}

/// Fetch from `source` and synchronize the vault for `today`.
///
/// Fails only when the configuration is unusable, the source cannot be read
/// or the output root cannot be prepared. Per-record and per-document
/// problems end up in the returned report.
pub fn run_sync(
    source: &dyn RecordSource,
    config: &SyncConfig,
    today: NaiveDate,
) -> Result<SyncReport> {
    let time = config.time_normalizer()?;
    let layout = config.layout();
    layout.prepare()?;

    let mut snapshot = Snapshot::collect(source, config, &time, today)?;
    let load = std::mem::take(&mut snapshot.report);
    let (warnings, errors) = load.error_count();
    info!(
        decoded = load.records_decoded,
        rejected = load.records_rejected,
        warnings,
        errors,
        "Records loaded"
    );

    let exporter = Exporter::new(&snapshot, config, today, time.now())?;
    let mut report = exporter.run();
    report.load = load;
    Ok(report)
}
