//! Embedded query directives
//!
//! The directives are opaque to the engine: a fixed template with the view
//! name, the scanned folder and a condition substituted in. They are
//! evaluated by the vault's viewer when a note is opened.

use chrono::NaiveDate;

use crate::time::DATE_LAYOUT;

/// Parameters shared by every directive
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    view: String,
    folder: String,
}

impl QueryTemplate {
    pub fn new(view: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            folder: folder.into(),
        }
    }

    /// Tasks whose parent is the current note
    pub fn children(&self) -> String {
        self.render(&["return p.frontmatter?.parent_id === c.frontmatter?.task_id;"])
    }

    /// Tasks filed under the current column note
    pub fn column(&self) -> String {
        self.render(&["return p.frontmatter?.column_id === c.frontmatter?.column_id;"])
    }

    /// Tasks whose start or due date falls in `[first, last]`
    pub fn date_range(&self, first: NaiveDate, last: NaiveDate) -> String {
        let first = format!(
            "const rangeStart = dv.date('{}');",
            first.format(DATE_LAYOUT)
        );
        let last = format!("const rangeEnd = dv.date('{}');", last.format(DATE_LAYOUT));
        self.render(&[
            "const day = v => {",
            "    const m = v ? String(v).match(/^(\\d{4}-\\d{2}-\\d{2})/) : null;",
            "    return m ? dv.date(m[1]) : null;",
            "};",
            first.as_str(),
            last.as_str(),
            "const inRange = d => d && d >= rangeStart && d <= rangeEnd;",
            "return inRange(day(p.frontmatter?.due_date)) || inRange(day(p.frontmatter?.start_date));",
        ])
    }

    fn render(&self, condition: &[&str]) -> String {
        let mut out = String::from("```dataviewjs\n");
        out.push_str(&format!("dv.view('{}', {{\n", self.view));
        out.push_str(&format!("    folderPath: '{}',\n", self.folder));
        out.push_str("    condition: (p, c) => {\n");
        for line in condition {
            out.push_str("        ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("    }\n");
        out.push_str("});\n");
        out.push_str("```\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> QueryTemplate {
        QueryTemplate::new("dida365TaskTable", "9.Archive/Dida365/Tasks")
    }

    #[test]
    fn test_children_directive() {
        let out = template().children();
        assert!(out.starts_with("```dataviewjs\ndv.view('dida365TaskTable', {\n"));
        assert!(out.contains("folderPath: '9.Archive/Dida365/Tasks',"));
        assert!(out.contains("p.frontmatter?.parent_id === c.frontmatter?.task_id"));
        assert!(out.ends_with("});\n```\n"));
    }

    #[test]
    fn test_date_range_substitutes_bounds() {
        let out = template().date_range(
            NaiveDate::from_ymd_opt(2024, 4, 29).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
        );
        assert!(out.contains("dv.date('2024-04-29')"));
        assert!(out.contains("dv.date('2024-05-05')"));
        assert!(out.contains(r"(\d{4}-\d{2}-\d{2})"));
    }
}
