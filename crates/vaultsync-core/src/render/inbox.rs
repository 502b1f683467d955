//! Unified project index (`Inbox/TasksInbox.md`)

use super::frontmatter::FrontMatter;
use super::task_line_tail;
use crate::hierarchy::{group_by_columns, nest, project_tasks};
use crate::models::{Project, Task};
use crate::time::{format_datetime, Instant};

fn push_group(out: &mut String, group: &[&Task]) {
    for (depth, task) in nest(group) {
        out.push_str(&format!("{}- [ ] {}\n", "  ".repeat(depth), task_line_tail(task)));
    }
    if !group.is_empty() {
        out.push('\n');
    }
}

fn push_project(out: &mut String, project: &Project, todo: &[Task]) {
    out.push_str(&format!("## {}\n\n", project.name));

    let tasks = project_tasks(&project.id, todo);
    let groups = group_by_columns(project, &tasks);

    push_group(out, &groups.unassigned);
    for group in &groups.columns {
        out.push_str(&format!("### {}\n\n", group.column.name));
        push_group(out, &group.tasks);
    }
}

/// Render the index of every task project's open tasks
pub fn render_project_index(projects: &[Project], todo: &[Task], updated: &Instant) -> String {
    let mut out = FrontMatter::new()
        .field("updated_time", format_datetime(updated))
        .render();
    for project in projects {
        push_project(&mut out, project, todo);
    }
    out
}
