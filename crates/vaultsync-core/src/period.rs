//! Calendar periods: day, ISO week and calendar month
//!
//! Boundaries are inclusive on both ends at second precision, so a day runs
//! from 00:00:00 to 23:59:59 in the fixed zone.

use chrono::{Datelike, Days, Duration, NaiveDate};

use crate::models::Task;
use crate::time::{format, Instant, TimeNormalizer, DATE_LAYOUT, MONTH_LAYOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Day,
    Week,
    Month,
}

/// A closed `[start, end]` span of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: Instant,
    pub end: Instant,
}

/// Monday of the week containing `date`, None before the first representable Monday
pub fn monday_of(date: NaiveDate) -> Option<NaiveDate> {
    let since_monday = date.weekday().num_days_from_monday();
    date.checked_sub_days(Days::new(u64::from(since_monday)))
}

/// First day of the month following `year`/`month`
fn first_of_next_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
}

impl Period {
    /// Local days `first..=last`, None when a bound leaves chrono's range
    fn spanning(
        tz: &TimeNormalizer,
        kind: PeriodKind,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Option<Self> {
        let start = tz.midnight(first)?;
        let end = tz
            .midnight(last.succ_opt()?)?
            .checked_sub_signed(Duration::seconds(1))?;
        Some(Self { kind, start, end })
    }

    /// The local day of `date`
    pub fn day(tz: &TimeNormalizer, date: NaiveDate) -> Option<Self> {
        Self::spanning(tz, PeriodKind::Day, date, date)
    }

    /// The Monday-to-Sunday week containing `date`
    pub fn iso_week(tz: &TimeNormalizer, date: NaiveDate) -> Option<Self> {
        let monday = monday_of(date)?;
        let sunday = monday.checked_add_days(Days::new(6))?;
        Self::spanning(tz, PeriodKind::Week, monday, sunday)
    }

    /// The calendar month `year`/`month`, or None for an invalid month
    pub fn month(tz: &TimeNormalizer, year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first_of_next_month(year, month)?.pred_opt()?;
        Self::spanning(tz, PeriodKind::Month, first, last)
    }

    /// The calendar month containing `date`
    pub fn month_of(tz: &TimeNormalizer, date: NaiveDate) -> Option<Self> {
        Self::month(tz, date.year(), date.month())
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Every day of the period, in order
    pub fn days(&self) -> Vec<NaiveDate> {
        self.first_day()
            .iter_days()
            .take_while(|d| *d <= self.last_day())
            .collect()
    }

    pub fn contains(&self, instant: &Instant) -> bool {
        *instant >= self.start && *instant <= self.end
    }

    /// Membership of a record's `[start, due]` span.
    ///
    /// Both present: the spans intersect. One present: it lies inside the
    /// period. Neither: never a member.
    pub fn matches_span(&self, start: Option<&Instant>, due: Option<&Instant>) -> bool {
        match (start, due) {
            (Some(start), Some(due)) => !(*due < self.start || *start > self.end),
            (Some(only), None) | (None, Some(only)) => self.contains(only),
            (None, None) => false,
        }
    }

    /// Membership of a task by its effective instants
    pub fn includes(&self, task: &Task) -> bool {
        self.matches_span(task.start.as_ref(), task.due.as_ref())
    }

    /// The single day a record is attributed to within this period.
    ///
    /// The due instant wins when it lies inside the period, then the start
    /// instant; a record with neither inside is not attributed to any day.
    pub fn bucket_day(&self, start: Option<&Instant>, due: Option<&Instant>) -> Option<NaiveDate> {
        due.filter(|d| self.contains(d))
            .or_else(|| start.filter(|s| self.contains(s)))
            .map(|instant| instant.date_naive())
    }

    /// Display label: `2024-05-01`, `2024-W18` or `2024-05`
    pub fn label(&self) -> String {
        match self.kind {
            PeriodKind::Day => format(&self.start, DATE_LAYOUT),
            PeriodKind::Week => {
                let week = self.first_day().iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            PeriodKind::Month => format(&self.start, MONTH_LAYOUT),
        }
    }
}

/// The ISO weeks overlapping a month, edge weeks included in full
pub fn weeks_of_month(tz: &TimeNormalizer, month: &Period) -> Vec<Period> {
    let mut weeks = Vec::new();
    let mut next = monday_of(month.first_day());
    while let Some(monday) = next.filter(|m| *m <= month.last_day()) {
        match Period::iso_week(tz, monday) {
            Some(week) => weeks.push(week),
            None => break,
        }
        next = monday.checked_add_days(Days::new(7));
    }
    weeks
}
