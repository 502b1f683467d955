//! Task and note documents (`Tasks/<id>.md`, `Notes/<id>.md`)

use super::frontmatter::FrontMatter;
use super::query::QueryTemplate;
use super::{task_link, MARKER_KEY};
use crate::hierarchy::TaskIndex;
use crate::models::Task;
use crate::rewrite::ContentRewriter;
use crate::time::format_datetime;

/// Front matter of a task, marker included
pub fn task_front_matter(task: &Task) -> FrontMatter {
    FrontMatter::new()
        .field("title", &task.title)
        .field("task_id", &task.id)
        .field("project_id", &task.project_id)
        .opt_field("column_id", task.column_id.as_deref())
        .opt_field("parent_id", task.parent_id.as_deref())
        .opt_field("priority", task.priority.raw())
        .opt_field("status", task.status.map(|s| s.raw()))
        .opt_field("start_date", task.start.as_ref().map(format_datetime))
        .opt_field("due_date", task.due.as_ref().map(format_datetime))
        .opt_field("created_time", task.created.as_ref().map(format_datetime))
        .opt_field(MARKER_KEY, task.modified.as_ref().map(format_datetime))
        .opt_field("completed_time", task.completed.as_ref().map(format_datetime))
}

fn push_body(
    out: &mut String,
    task: &Task,
    index: &TaskIndex<'_>,
    rewriter: &ContentRewriter,
    query: &QueryTemplate,
) {
    out.push_str(&format!("# {}\n\n", task.title));

    for text in [&task.content, &task.desc].into_iter().flatten() {
        out.push_str(&rewriter.rewrite(text.trim_end(), &task.project_id, &task.id));
        out.push_str("\n\n");
    }

    if !task.items.is_empty() {
        out.push_str("## Items\n\n");
        for item in &task.items {
            let mark = if item.is_done() { 'x' } else { ' ' };
            out.push_str(&format!("- [{}] {}\n", mark, item.title));
        }
        out.push('\n');
    }

    if let Some(parent) = index.parent_of(task) {
        out.push_str("## Parent task\n\n");
        out.push_str(&task_link(parent));
        out.push_str("\n\n");
    }

    if task.has_children() {
        out.push_str("## Subtasks\n\n");
        out.push_str(&query.children());
    }
}

/// Render a task or note document
pub fn render_task_note(
    task: &Task,
    index: &TaskIndex<'_>,
    rewriter: &ContentRewriter,
    query: &QueryTemplate,
) -> String {
    let mut out = task_front_matter(task).render();
    push_body(&mut out, task, index, rewriter, query);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::DuplicatePolicy;
    use crate::models::{Priority, TaskItem};
    use crate::render::extract_field;
    use crate::render::fixtures::{at, task};

    fn rewriter() -> ContentRewriter {
        ContentRewriter::new("https://dida365.com/api/v1/attachment", "dida365.com").unwrap()
    }

    fn query() -> QueryTemplate {
        QueryTemplate::new("dida365TaskTable", "9.Archive/Dida365/Tasks")
    }

    #[test]
    fn test_full_task_note() {
        let mut parent = task("parent", "Quarterly plan");
        parent.child_ids = vec!["t1".to_string()];

        let mut t = task("t1", "Write report");
        t.column_id = Some("c1".to_string());
        t.parent_id = Some("parent".to_string());
        t.priority = Priority::new(Some(3));
        t.start = at("2024-05-01 00:00:00");
        t.due = at("2024-05-02 00:00:00");
        t.modified = at("2024-05-01 09:30:00");
        t.content = Some("See ![image](ab12/pic.png)".to_string());
        t.desc = Some("Ref [Plan](https://dida365.com/webapp/#p/p1/tasks/parent)".to_string());
        t.child_ids = vec!["t2".to_string()];
        t.items = vec![
            TaskItem {
                title: "outline".to_string(),
                completed: at("2024-05-01 10:00:00"),
            },
            TaskItem {
                title: "draft".to_string(),
                completed: None,
            },
        ];

        let tasks = vec![parent, t];
        let index = TaskIndex::build(&tasks, &[], DuplicatePolicy::default());
        let doc = render_task_note(&tasks[1], &index, &rewriter(), &query());

        assert!(doc.starts_with(
            "---\ntitle: Write report\ntask_id: t1\nproject_id: p1\ncolumn_id: c1\nparent_id: parent\npriority: 3\nstatus: 0\nstart_date: 2024-05-01 00:00:00\ndue_date: 2024-05-02 00:00:00\nmodified_time: 2024-05-01 09:30:00\n---\n\n# Write report\n\n"
        ));
        assert!(doc.contains("https://dida365.com/api/v1/attachment/p1/t1/ab12.jpg"));
        assert!(doc.contains("Ref [[parent|Plan]]"));
        assert!(doc.contains("## Items\n\n- [x] outline\n- [ ] draft\n"));
        assert!(doc.contains("## Parent task\n\n[[parent|Quarterly plan]]\n"));
        assert!(doc.contains("## Subtasks\n\n```dataviewjs"));
        assert_eq!(
            extract_field(&doc, MARKER_KEY).as_deref(),
            Some("2024-05-01 09:30:00")
        );
    }

    #[test]
    fn test_body_sections_in_order() {
        let mut parent = task("parent", "Plan");
        parent.child_ids = vec!["t1".to_string()];

        let mut t = task("t1", "Report");
        t.parent_id = Some("parent".to_string());
        t.content = Some("first\n\n".to_string());
        t.desc = Some("second".to_string());
        t.items = vec![TaskItem {
            title: "draft".to_string(),
            completed: None,
        }];
        t.child_ids = vec!["t2".to_string()];

        let tasks = vec![parent, t];
        let index = TaskIndex::build(&tasks, &[], DuplicatePolicy::default());
        let doc = render_task_note(&tasks[1], &index, &rewriter(), &query());

        let body = doc.split("---\n\n").nth(1).unwrap();
        let expected = format!(
            "# Report\n\nfirst\n\nsecond\n\n## Items\n\n- [ ] draft\n\n\
             ## Parent task\n\n[[parent|Plan]]\n\n## Subtasks\n\n{}",
            query().children()
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn test_minimal_task_note_omits_missing_fields() {
        let mut t = task("t1", "Bare");
        t.parent_id = Some("unknown".to_string());
        t.status = None;

        let tasks = vec![t];
        let index = TaskIndex::build(&tasks, &[], DuplicatePolicy::default());
        let doc = render_task_note(&tasks[0], &index, &rewriter(), &query());

        assert_eq!(
            doc,
            "---\ntitle: Bare\ntask_id: t1\nproject_id: p1\nparent_id: unknown\n---\n\n# Bare\n\n"
        );
    }
}
