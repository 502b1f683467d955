//! Document builders
//!
//! Every renderer is a pure function from models to text: front matter in a
//! fixed key order, then a markdown body. Nothing here touches the disk.

pub mod column_note;
pub mod frontmatter;
pub mod inbox;
pub mod memo;
pub mod query;
pub mod summary;
pub mod task_note;

pub use column_note::render_column_note;
pub use frontmatter::{extract_field, FrontMatter};
pub use inbox::render_project_index;
pub use memo::{render_daily_memos, render_weekly_memos};
pub use query::QueryTemplate;
pub use summary::{render_daily_summary, render_monthly_summary, render_weekly_summary, DailyHabits};
pub use task_note::render_task_note;

use crate::models::Task;
use crate::time::format_date;

/// Front matter key holding the change-detection marker
pub const MARKER_KEY: &str = "modified_time";

/// `[[<id>|<title>]]`
pub fn task_link(task: &Task) -> String {
    let title = task.title.replace(['\r', '\n'], " ").replace('|', "/");
    format!("[[{}|{}]]", task.id, title.trim())
}

/// `📅 due`, `🛫 start ~ 📅 due` or `🛫 start` from the effective instants
pub fn time_range(task: &Task) -> Option<String> {
    let start = task.start.as_ref().map(format_date);
    let due = task.due.as_ref().map(format_date);

    match (start, due) {
        (Some(start), Some(due)) if start == due => Some(format!("📅 {due}")),
        (Some(start), Some(due)) => Some(format!("🛫 {start} ~ 📅 {due}")),
        (Some(start), None) => Some(format!("🛫 {start}")),
        (None, Some(due)) => Some(format!("📅 {due}")),
        (None, None) => None,
    }
}

/// `[[id|title]] | <glyph>[ | <range>]`, shared by index and summary lines
pub(crate) fn task_line_tail(task: &Task) -> String {
    let mut line = format!("{} | {}", task_link(task), task.priority.glyph());
    if let Some(range) = time_range(task) {
        line.push_str(" | ");
        line.push_str(&range);
    }
    line
}
