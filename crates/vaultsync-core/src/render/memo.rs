//! Memo summaries (`Memos/1.Daily`, `Memos/2.Weekly`)

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::frontmatter::FrontMatter;
use crate::models::Memo;
use crate::period::Period;
use crate::time::{format, format_datetime, Instant, TIME_LAYOUT};

const INDENT: &str = "    ";

/// One memo as a time-stamped bullet with an indented body
fn push_entry(out: &mut String, memo: &Memo) {
    out.push_str(&format!("- **{}**\n", format(&memo.created, TIME_LAYOUT)));
    for line in memo.content.trim_end().lines() {
        if !line.trim().is_empty() {
            out.push_str(INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
    for resource in &memo.resources {
        out.push_str(&format!("{INDENT}- {}", resource.filename));
        if let Some(link) = &resource.external_link {
            out.push_str(&format!(" ([link]({link}))"));
        }
        out.push('\n');
    }
    out.push('\n');
}

/// Memos inside `period`, newest first
fn newest_first<'a>(period: &Period, memos: &'a [Memo]) -> Vec<&'a Memo> {
    let mut selected: Vec<&Memo> = memos.iter().filter(|m| period.contains(&m.created)).collect();
    selected.sort_by(|a, b| b.created_ts.cmp(&a.created_ts));
    selected
}

fn header(updated: &Instant) -> String {
    FrontMatter::new()
        .field("updated_time", format_datetime(updated))
        .render()
}

/// Daily memo summary of `day`
pub fn render_daily_memos(day: &Period, memos: &[Memo], updated: &Instant) -> String {
    let mut out = header(updated);
    out.push_str(&format!("# {} memos\n\n", day.first_day()));

    let selected = newest_first(day, memos);
    if selected.is_empty() {
        out.push_str("No memos today.\n");
    }
    for memo in selected {
        push_entry(&mut out, memo);
    }
    out
}

/// Weekly memo summary with one section per day, Monday first
pub fn render_weekly_memos(week: &Period, memos: &[Memo], updated: &Instant) -> String {
    let mut out = header(updated);
    out.push_str(&format!(
        "# {} to {} memos\n\n",
        week.first_day(),
        week.last_day()
    ));

    let mut by_day: BTreeMap<NaiveDate, Vec<&Memo>> = BTreeMap::new();
    for memo in newest_first(week, memos) {
        if let Some(day) = week.bucket_day(Some(&memo.created), None) {
            by_day.entry(day).or_default().push(memo);
        }
    }

    for day in week.days() {
        out.push_str(&format!("## {day}\n\n"));
        match by_day.get(&day) {
            Some(entries) => {
                for memo in entries {
                    push_entry(&mut out, memo);
                }
            }
            None => out.push_str("No memos.\n\n"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemoResource;
    use crate::render::fixtures::at;
    use crate::time::TimeNormalizer;

    fn memo(raw: &str, content: &str) -> Memo {
        let created = at(raw).unwrap();
        Memo {
            content: content.to_string(),
            created_ts: created.timestamp(),
            created,
            row_status: Some("NORMAL".to_string()),
            resources: Vec::new(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_memos_window_and_order() {
        let tz = TimeNormalizer::default();
        let mut with_file = memo("2024-05-02 23:59:59", "late\n\nsecond para");
        with_file.resources = vec![
            MemoResource {
                filename: "a.png".to_string(),
                external_link: Some("https://x/a.png".to_string()),
            },
            MemoResource {
                filename: "b.txt".to_string(),
                external_link: None,
            },
        ];
        let memos = vec![
            memo("2024-05-02 00:00:00", "early"),
            with_file,
            memo("2024-05-01 23:59:59", "yesterday"),
            memo("2024-05-03 00:00:00", "tomorrow"),
        ];
        let day = Period::day(&tz, date(2024, 5, 2)).unwrap();
        let doc = render_daily_memos(&day, &memos, &at("2024-05-02 23:00:00").unwrap());

        let body = doc.split("---\n\n").nth(1).unwrap();
        assert_eq!(
            body,
            "# 2024-05-02 memos\n\n\
             - **23:59:59**\n    late\n\n    second para\n    - a.png ([link](https://x/a.png))\n    - b.txt\n\n\
             - **00:00:00**\n    early\n\n"
        );
    }

    #[test]
    fn test_daily_memos_empty() {
        let tz = TimeNormalizer::default();
        let day = Period::day(&tz, date(2024, 5, 2)).unwrap();
        let doc = render_daily_memos(&day, &[], &at("2024-05-02 23:00:00").unwrap());
        assert!(doc.ends_with("# 2024-05-02 memos\n\nNo memos today.\n"));
    }

    #[test]
    fn test_weekly_memos_sections() {
        let tz = TimeNormalizer::default();
        let memos = vec![
            memo("2024-04-29 08:00:00", "monday"),
            memo("2024-05-05 22:00:00", "sunday"),
            memo("2024-05-06 00:00:00", "next week"),
        ];
        let week = Period::iso_week(&tz, date(2024, 5, 1)).unwrap();
        let doc = render_weekly_memos(&week, &memos, &at("2024-05-05 23:00:00").unwrap());

        assert!(doc.contains("# 2024-04-29 to 2024-05-05 memos\n\n"));
        assert!(doc.contains("## 2024-04-29\n\n- **08:00:00**\n    monday\n\n## 2024-04-30\n\nNo memos.\n\n"));
        assert!(doc.contains("## 2024-05-05\n\n- **22:00:00**\n    sunday\n\n"));
        assert!(!doc.contains("next week"));
        assert_eq!(doc.matches("## ").count(), 7);
    }
}
