//! Period summaries: daily, weekly and monthly calendar documents

use chrono::Datelike;

use super::frontmatter::FrontMatter;
use super::query::QueryTemplate;
use super::task_line_tail;
use crate::models::task::summary_order;
use crate::models::{CheckinMap, Habit, Task};
use crate::period::Period;
use crate::time::{format_date, format_datetime, Instant, MONTH_LAYOUT};

/// Habit state feeding the daily checklist
#[derive(Debug, Clone, Copy)]
pub struct DailyHabits<'a> {
    pub habits: &'a [Habit],
    pub checkins: &'a CheckinMap,
    /// Local-midnight epoch of the summarized day
    pub day_stamp: i64,
}

fn summary_front_matter(updated: &Instant) -> String {
    FrontMatter::new()
        .field("updated_time", format_datetime(updated))
        .render()
}

fn push_habits(out: &mut String, habits: &DailyHabits<'_>) {
    let active: Vec<&Habit> = habits.habits.iter().filter(|h| h.active).collect();
    if active.is_empty() {
        return;
    }

    out.push_str("## Habits\n\n");
    for habit in active {
        match habit.checkin_on(habits.checkins, habits.day_stamp) {
            Some(checkin) => {
                let done = checkin.checked_at.as_ref().map(format_date).unwrap_or_default();
                out.push_str(&format!("- [x] {} | ✅ {}\n", habit.name, done));
            }
            None => out.push_str(&format!("- [ ] {}\n", habit.name)),
        }
    }
    out.push('\n');
}

fn push_daily_tasks(out: &mut String, day: &Period, tasks: &[&Task]) {
    let in_day: Vec<&Task> = tasks.iter().copied().filter(|t| day.includes(t)).collect();
    if in_day.is_empty() {
        out.push_str("No tasks today.\n");
        return;
    }

    let mut todo: Vec<&Task> = in_day.iter().copied().filter(|t| t.is_todo()).collect();
    let mut done: Vec<&Task> = in_day.iter().copied().filter(|t| t.is_completed()).collect();
    todo.sort_by(|a, b| summary_order(a, b));
    done.sort_by(|a, b| summary_order(a, b));

    if !todo.is_empty() {
        out.push_str("## To do\n\n");
        for (n, task) in todo.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", n + 1, task_line_tail(task)));
        }
        out.push('\n');
    }

    if !done.is_empty() {
        out.push_str("## Completed\n\n");
        for task in done {
            out.push_str(&format!("- [x] {}", task_line_tail(task)));
            if let Some(completed) = &task.completed {
                out.push_str(&format!(" | ✅ {}", format_date(completed)));
            }
            out.push('\n');
        }
        out.push('\n');
    }
}

/// Render the daily summary of `day` from every candidate task
pub fn render_daily_summary(
    day: &Period,
    tasks: &[&Task],
    habits: Option<&DailyHabits<'_>>,
    updated: &Instant,
) -> String {
    let mut out = summary_front_matter(updated);
    if let Some(habits) = habits {
        push_habits(&mut out, habits);
    }
    push_daily_tasks(&mut out, day, tasks);
    out
}

/// Weekly summary: heading, period line and a date-range directive
pub fn render_weekly_summary(week: &Period, query: &QueryTemplate, updated: &Instant) -> String {
    let iso = week.first_day().iso_week();
    let mut out = summary_front_matter(updated);
    out.push_str(&format!(
        "# {} week {:02} task summary\n\n",
        iso.year(),
        iso.week()
    ));
    out.push_str(&format!(
        "Period: {} to {}\n\n",
        week.first_day(),
        week.last_day()
    ));
    out.push_str(&query.date_range(week.first_day(), week.last_day()));
    out
}

/// Monthly summary: heading and a date-range directive
pub fn render_monthly_summary(month: &Period, query: &QueryTemplate, updated: &Instant) -> String {
    let mut out = summary_front_matter(updated);
    out.push_str(&format!(
        "# {} task summary\n\n",
        month.start.format(MONTH_LAYOUT)
    ));
    out.push_str(&query.date_range(month.first_day(), month.last_day()));
    out
}
