//! Timestamp normalization
//!
//! Upstream records mix RFC 3339 (with or without fractional seconds, offsets
//! written with or without a colon), bare date-times, bare dates and epoch
//! seconds. Everything is normalized into a single fixed-offset zone so that
//! bucketing and formatting never depend on the host's local time zone.
//!
//! Strings without an offset are UTC, as the upstream API writes them.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

/// Canonical second-precision layout, also used for the document marker
pub const DATETIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_LAYOUT: &str = "%Y-%m-%d";
pub const TIME_LAYOUT: &str = "%H:%M:%S";
pub const MONTH_LAYOUT: &str = "%Y-%m";

/// An instant expressed in the normalizer's fixed zone
pub type Instant = DateTime<FixedOffset>;

/// Zoned layouts, tried in order after RFC 3339
const ZONED_LAYOUTS: &[&str] = &[
    // 2024-05-01T16:00:00.000+0000 (offset without colon, optional fraction)
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Zone-less layouts, read as UTC
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses and formats timestamps in one fixed, DST-free zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    zone: FixedOffset,
}

impl Default for TimeNormalizer {
    /// UTC+8
    fn default() -> Self {
        Self::new(8).unwrap_or(Self { zone: Utc.fix() })
    }
}

impl TimeNormalizer {
    /// Returns None when the offset is outside +/-23 hours
    pub fn new(utc_offset_hours: i32) -> Option<Self> {
        let seconds = utc_offset_hours.checked_mul(3600)?;
        FixedOffset::east_opt(seconds).map(|zone| Self { zone })
    }

    /// Parse a timestamp string into the fixed zone.
    ///
    /// Returns `None` for empty or unrecognised input: the field is unknown,
    /// never "epoch zero". Instants whose local time falls outside chrono's
    /// calendar are unknown too.
    pub fn parse(&self, raw: &str) -> Option<Instant> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return self.zoned(dt.naive_utc());
        }

        for layout in ZONED_LAYOUTS {
            if let Ok(dt) = DateTime::parse_from_str(raw, layout) {
                return self.zoned(dt.naive_utc());
            }
        }

        for layout in NAIVE_LAYOUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
                return self.zoned(naive);
            }
        }

        NaiveDate::parse_from_str(raw, DATE_LAYOUT)
            .ok()
            .and_then(|date| self.zoned(date.and_time(NaiveTime::MIN)))
    }

    /// Parse an optional field, treating absence and garbage alike
    pub fn parse_opt(&self, raw: Option<&str>) -> Option<Instant> {
        raw.and_then(|r| self.parse(r))
    }

    /// Convert epoch seconds into the fixed zone
    pub fn at_epoch(&self, seconds: i64) -> Option<Instant> {
        DateTime::from_timestamp(seconds, 0).and_then(|dt| self.zoned(dt.naive_utc()))
    }

    fn offset(&self) -> Duration {
        Duration::seconds(i64::from(self.zone.local_minus_utc()))
    }

    /// A UTC date-time seen from the fixed zone, None when its local time is unrepresentable
    fn zoned(&self, utc: NaiveDateTime) -> Option<Instant> {
        utc.checked_add_signed(self.offset())?;
        Some(DateTime::from_naive_utc_and_offset(utc, self.zone))
    }

    /// Interpret a wall-clock date-time as local to the fixed zone.
    ///
    /// None when the matching UTC instant falls outside chrono's range.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<Instant> {
        let utc = naive.checked_sub_signed(self.offset())?;
        Some(DateTime::from_naive_utc_and_offset(utc, self.zone))
    }

    /// 00:00:00 of `date` in the fixed zone
    pub fn midnight(&self, date: NaiveDate) -> Option<Instant> {
        self.localize(date.and_time(NaiveTime::MIN))
    }

    /// Epoch second of local midnight, the key habit checkins are stamped with
    pub fn day_stamp(&self, date: NaiveDate) -> Option<i64> {
        self.midnight(date).map(|midnight| midnight.timestamp())
    }

    /// Current instant in the fixed zone
    pub fn now(&self) -> Instant {
        Utc::now().with_timezone(&self.zone)
    }
}

/// Render an instant with a chrono layout pattern
pub fn format(instant: &Instant, layout: &str) -> String {
    instant.format(layout).to_string()
}

/// Canonical second-precision rendering
pub fn format_datetime(instant: &Instant) -> String {
    format(instant, DATETIME_LAYOUT)
}

pub fn format_date(instant: &Instant) -> String {
    format(instant, DATE_LAYOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz() -> TimeNormalizer {
        TimeNormalizer::default()
    }

    #[test]
    fn test_rfc3339_utc_is_shifted_into_zone() {
        let t = tz().parse("2024-05-01T16:00:00Z").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-02 00:00:00");
        assert_eq!(t.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_fractional_seconds_and_compact_offset() {
        let t = tz().parse("2024-05-01T16:00:00.000+0000").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-02 00:00:00");

        let t = tz().parse("2024-05-01T10:30:15.250+08:00").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-01 10:30:15");
    }

    #[test]
    fn test_bare_datetime_is_utc() {
        let t = tz().parse("2024-05-01 20:15:00").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-02 04:15:00");
        assert_eq!(t, tz().parse("2024-05-01T20:15:00Z").unwrap());

        let t = tz().parse("2024-02-29 23:59:59.500").unwrap();
        assert_eq!(format_datetime(&t), "2024-03-01 07:59:59");
    }

    #[test]
    fn test_zoneless_t_separator() {
        let t = tz().parse("2024-05-01T08:15:00").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-01 16:15:00");
    }

    #[test]
    fn test_bare_date_is_utc_midnight() {
        let t = tz().parse("2024-05-03").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-03 08:00:00");
        assert_eq!(format(&t, DATE_LAYOUT), "2024-05-03");

        let utc = TimeNormalizer::new(0).unwrap();
        let t = utc.parse("2024-05-03").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-03 00:00:00");
    }

    #[test]
    fn test_localize_keeps_wall_clock() {
        let naive = NaiveDateTime::parse_from_str("2024-05-01 08:15:00", DATETIME_LAYOUT).unwrap();
        let t = tz().localize(naive).unwrap();
        assert_eq!(format_datetime(&t), "2024-05-01 08:15:00");
        assert_eq!(t, tz().parse("2024-05-01T08:15:00+08:00").unwrap());
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        assert!(tz().parse("-262143-01-01").is_some());
        assert!(tz().parse("-262143-01-01 00:00:00").is_some());
        assert!(tz().parse("+262142-12-31 15:59:59").is_some());
        assert!(tz().parse("+262142-12-31 16:00:00").is_none());
        assert!(tz().parse("+262142-12-31T16:00:00+0000").is_none());
        assert!(tz().at_epoch(i64::MAX).is_none());

        assert!(tz().midnight(NaiveDate::MIN).is_none());
        assert!(tz().day_stamp(NaiveDate::MIN).is_none());
        assert!(tz().midnight(NaiveDate::MAX).is_some());
    }

    #[test]
    fn test_unparsable_is_absent() {
        assert!(tz().parse("").is_none());
        assert!(tz().parse("   ").is_none());
        assert!(tz().parse("yesterday").is_none());
        assert!(tz().parse("2024-13-01").is_none());
        assert!(tz().parse_opt(None).is_none());
    }

    #[test]
    fn test_epoch_seconds() {
        // 2024-05-01 00:00:00 UTC
        let t = tz().at_epoch(1_714_521_600).unwrap();
        assert_eq!(format_datetime(&t), "2024-05-01 08:00:00");
    }

    #[test]
    fn test_day_stamp_is_local_midnight_epoch() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        // 2024-04-30 16:00:00 UTC
        assert_eq!(tz().day_stamp(date), Some(1_714_492_800));
    }

    #[test]
    fn test_custom_offset() {
        let utc = TimeNormalizer::new(0).unwrap();
        let t = utc.parse("2024-05-01T16:00:00+08:00").unwrap();
        assert_eq!(format_datetime(&t), "2024-05-01 08:00:00");
        assert!(TimeNormalizer::new(30).is_none());
    }
}
