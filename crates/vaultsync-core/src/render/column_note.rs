//! Column documents (`Columns/<column-id>.md`)

use super::frontmatter::FrontMatter;
use super::query::QueryTemplate;
use super::MARKER_KEY;
use crate::models::{Column, Project};
use crate::time::format_datetime;

/// Render a column note; `project` is the owning project when it is known
pub fn render_column_note(column: &Column, project: Option<&Project>, query: &QueryTemplate) -> String {
    let mut out = FrontMatter::new()
        .field("title", &column.name)
        .field("column_id", &column.id)
        .field("project_id", &column.project_id)
        .opt_field("created_time", column.created.as_ref().map(format_datetime))
        .opt_field(MARKER_KEY, column.modified.as_ref().map(format_datetime))
        .render();

    match project {
        Some(project) => out.push_str(&format!("# {} — {}\n\n", project.name, column.name)),
        None => out.push_str(&format!("# {}\n\n", column.name)),
    }
    out.push_str(&query.column());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectKind;
    use crate::render::fixtures::at;

    fn column() -> Column {
        Column {
            id: "c1".to_string(),
            name: "Doing".to_string(),
            project_id: "p1".to_string(),
            created: at("2024-04-01 12:00:00"),
            modified: None,
            sort_order: Some(0),
        }
    }

    #[test]
    fn test_column_note_with_project() {
        let project = Project {
            id: "p1".to_string(),
            name: "Work".to_string(),
            kind: ProjectKind::Task,
            columns: vec![column()],
        };
        let query = QueryTemplate::new("dida365TaskTable", "9.Archive/Dida365/Tasks");
        let doc = render_column_note(&project.columns[0], Some(&project), &query);

        assert!(doc.starts_with(
            "---\ntitle: Doing\ncolumn_id: c1\nproject_id: p1\ncreated_time: 2024-04-01 12:00:00\n---\n\n# Work — Doing\n\n```dataviewjs\n"
        ));
        assert!(doc.contains("p.frontmatter?.column_id === c.frontmatter?.column_id"));
    }

    #[test]
    fn test_column_note_without_project() {
        let query = QueryTemplate::new("v", "f");
        let doc = render_column_note(&column(), None, &query);
        assert!(doc.contains("\n# Doing\n\n"));
    }
}
