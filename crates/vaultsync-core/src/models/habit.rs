//! Habits and their daily checkins

use std::collections::HashMap;

use crate::time::Instant;

/// Upstream status of a completed checkin
const CHECKIN_DONE: i64 = 2;

/// A tracked habit
#[derive(Debug, Clone)]
pub struct Habit {
    pub id: String,
    pub name: String,
    /// Upstream status 0; archived habits are inactive
    pub active: bool,
}

/// One checkin of a habit on a given day
#[derive(Debug, Clone)]
pub struct HabitCheckin {
    /// Epoch second of local midnight of the checked day
    pub stamp: i64,
    pub status: Option<i64>,
    pub checked_at: Option<Instant>,
}

impl HabitCheckin {
    pub fn is_done(&self) -> bool {
        self.status == Some(CHECKIN_DONE)
    }
}

/// Checkins keyed by habit id
pub type CheckinMap = HashMap<String, Vec<HabitCheckin>>;

impl Habit {
    /// The completed checkin for `day_stamp`, if the habit was checked that day
    pub fn checkin_on<'a>(&self, checkins: &'a CheckinMap, day_stamp: i64) -> Option<&'a HabitCheckin> {
        checkins
            .get(&self.id)?
            .iter()
            .find(|c| c.stamp == day_stamp && c.is_done())
    }
}
