//! Project → column → task containment and parent/child resolution

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::models::task::summary_order;
use crate::models::{Column, Project, Task};

/// Which record wins when an id is both in the todo and the completed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Completed is the later lifecycle state
    #[default]
    PreferCompleted,
    PreferTodo,
}

/// Id-keyed lookup across todo and completed tasks
#[derive(Debug, Default)]
pub struct TaskIndex<'a> {
    by_id: HashMap<&'a str, &'a Task>,
}

impl<'a> TaskIndex<'a> {
    pub fn build(todo: &'a [Task], completed: &'a [Task], policy: DuplicatePolicy) -> Self {
        let (first, last) = match policy {
            DuplicatePolicy::PreferCompleted => (todo, completed),
            DuplicatePolicy::PreferTodo => (completed, todo),
        };

        // Later insertion wins
        let by_id = first
            .iter()
            .chain(last.iter())
            .map(|task| (task.id.as_str(), task))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Task> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// The parent task, when the reference resolves
    pub fn parent_of(&self, task: &Task) -> Option<&'a Task> {
        task.parent_id.as_deref().and_then(|id| self.get(id))
    }
}

/// Tasks owned by one project, in source order
pub fn project_tasks<'a>(project_id: &str, tasks: &'a [Task]) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.project_id == project_id).collect()
}

/// Tasks of one column
#[derive(Debug)]
pub struct ColumnGroup<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
}

/// A project's tasks split by column
#[derive(Debug)]
pub struct ProjectGroups<'a> {
    /// Tasks without a column, or whose column the project does not own
    pub unassigned: Vec<&'a Task>,
    /// One group per column in declaration order, empty groups included
    pub columns: Vec<ColumnGroup<'a>>,
}

pub fn group_by_columns<'a>(project: &'a Project, tasks: &[&'a Task]) -> ProjectGroups<'a> {
    let mut columns: Vec<ColumnGroup<'a>> = project
        .columns
        .iter()
        .map(|column| ColumnGroup {
            column,
            tasks: Vec::new(),
        })
        .collect();
    let mut unassigned = Vec::new();

    for &task in tasks {
        let group = task
            .column_id
            .as_deref()
            .and_then(|id| columns.iter_mut().find(|g| g.column.id == id));
        match group {
            Some(group) => group.tasks.push(task),
            None => unassigned.push(task),
        }
    }

    ProjectGroups {
        unassigned,
        columns,
    }
}

/// Order a group for listing: summary order, subtasks nested under parents.
///
/// Returns `(depth, task)` pairs depth-first. A task is nested only when its
/// parent is part of the same group; everything else is a root.
pub fn nest<'a>(group: &[&'a Task]) -> Vec<(usize, &'a Task)> {
    let members: HashMap<&str, &'a Task> = group.iter().map(|t| (t.id.as_str(), *t)).collect();

    let mut roots: Vec<&'a Task> = group
        .iter()
        .copied()
        .filter(|t| {
            t.parent_id
                .as_deref()
                .map_or(true, |parent| !members.contains_key(parent))
        })
        .collect();
    roots.sort_by(|a, b| summary_order(a, b));

    let mut out = Vec::with_capacity(group.len());
    let mut seen = HashSet::new();
    for root in roots {
        visit(root, 0, &members, &mut seen, &mut out);
    }

    // Parent links that form a cycle, or children missing from the parent's
    // child list, still get listed
    let mut rest: Vec<&'a Task> = group
        .iter()
        .copied()
        .filter(|t| !seen.contains(t.id.as_str()))
        .collect();
    rest.sort_by(|a, b| summary_order(a, b));
    for task in rest {
        visit(task, 0, &members, &mut seen, &mut out);
    }
    out
}

fn visit<'a>(
    task: &'a Task,
    depth: usize,
    members: &HashMap<&str, &'a Task>,
    seen: &mut HashSet<&'a str>,
    out: &mut Vec<(usize, &'a Task)>,
) {
    if !seen.insert(task.id.as_str()) {
        return;
    }
    out.push((depth, task));

    let mut children: Vec<&'a Task> = task
        .child_ids
        .iter()
        .filter_map(|id| members.get(id.as_str()).copied())
        .collect();
    children.sort_by(|a, b| summary_order(a, b));
    for child in children {
        visit(child, depth + 1, members, seen, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskKind, TaskStatus};

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            project_id: "p1".to_string(),
            column_id: None,
            parent_id: None,
            child_ids: Vec::new(),
            kind: TaskKind::Text,
            priority: Priority::default(),
            status: Some(status),
            is_all_day: false,
            start: None,
            due: None,
            created: None,
            modified: None,
            completed: None,
            content: None,
            desc: None,
            items: Vec::new(),
        }
    }

    fn column(id: &str) -> Column {
        Column {
            id: id.to_string(),
            name: id.to_uppercase(),
            project_id: "p1".to_string(),
            created: None,
            modified: None,
            sort_order: None,
        }
    }

    #[test]
    fn test_duplicate_policy_prefer_completed() {
        let todo = vec![task("dup", TaskStatus::Todo)];
        let done = vec![task("dup", TaskStatus::Completed)];

        let index = TaskIndex::build(&todo, &done, DuplicatePolicy::PreferCompleted);
        assert_eq!(index.len(), 1);
        assert!(index.get("dup").unwrap().is_completed());
    }

    #[test]
    fn test_duplicate_policy_prefer_todo() {
        let todo = vec![task("dup", TaskStatus::Todo)];
        let done = vec![task("dup", TaskStatus::Completed)];

        let index = TaskIndex::build(&todo, &done, DuplicatePolicy::PreferTodo);
        assert!(index.get("dup").unwrap().is_todo());
    }

    #[test]
    fn test_missing_parent_is_omitted() {
        let mut parent = task("parent", TaskStatus::Todo);
        parent.child_ids = vec!["child".to_string()];
        let mut child = task("child", TaskStatus::Todo);
        child.parent_id = Some("parent".to_string());
        let mut orphan = task("orphan", TaskStatus::Todo);
        orphan.parent_id = Some("gone".to_string());

        let todo = vec![parent, child, orphan];
        let index = TaskIndex::build(&todo, &[], DuplicatePolicy::default());

        assert_eq!(index.parent_of(&todo[1]).unwrap().id, "parent");
        assert!(index.parent_of(&todo[2]).is_none());
    }

    #[test]
    fn test_group_by_columns_keeps_order_and_empty_columns() {
        let project = Project {
            id: "p1".to_string(),
            name: "Work".to_string(),
            kind: crate::models::ProjectKind::Task,
            columns: vec![column("c1"), column("c2"), column("c3")],
        };
        let mut a = task("a", TaskStatus::Todo);
        a.column_id = Some("c2".to_string());
        let mut b = task("b", TaskStatus::Todo);
        b.column_id = Some("elsewhere".to_string());
        let c = task("c", TaskStatus::Todo);
        let tasks = vec![a, b, c];

        let refs = project_tasks("p1", &tasks);
        let groups = group_by_columns(&project, &refs);

        let names: Vec<_> = groups.columns.iter().map(|g| g.column.id.as_str()).collect();
        assert_eq!(names, vec!["c1", "c2", "c3"]);
        assert!(groups.columns[0].tasks.is_empty());
        assert_eq!(groups.columns[1].tasks[0].id, "a");
        let unassigned: Vec<_> = groups.unassigned.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(unassigned, vec!["b", "c"]);
    }

    #[test]
    fn test_nest_places_subtasks_under_parent() {
        let mut parent = task("parent", TaskStatus::Todo);
        parent.priority = Priority::new(Some(1));
        parent.child_ids = vec!["child".to_string()];
        let mut child = task("child", TaskStatus::Todo);
        child.parent_id = Some("parent".to_string());
        child.priority = Priority::new(Some(5));
        let mut urgent = task("urgent", TaskStatus::Todo);
        urgent.priority = Priority::new(Some(5));

        let tasks = vec![child, parent, urgent];
        let refs: Vec<&Task> = tasks.iter().collect();
        let listed: Vec<_> = nest(&refs)
            .into_iter()
            .map(|(depth, t)| (depth, t.id.as_str()))
            .collect();

        assert_eq!(listed, vec![(0, "urgent"), (0, "parent"), (1, "child")]);
    }

    #[test]
    fn test_nest_survives_cycles_and_unlisted_children() {
        let mut a = task("a", TaskStatus::Todo);
        a.parent_id = Some("b".to_string());
        a.child_ids = vec!["b".to_string()];
        let mut b = task("b", TaskStatus::Todo);
        b.parent_id = Some("a".to_string());
        b.child_ids = vec!["a".to_string()];

        let tasks = vec![a, b];
        let refs: Vec<&Task> = tasks.iter().collect();
        let listed = nest(&refs);
        assert_eq!(listed.len(), 2);
    }
}
