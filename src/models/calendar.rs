//! Calendar arithmetic for roster planning.
//!
//! Defines the weekday and week-of-month conventions used by cadence
//! rules, plus interval overlap for same-day sessions.
//!
//! # Conventions
//! - Weekdays are numbered 1..=7 with Monday = 1 and Sunday = 7.
//! - Week-of-month buckets day-of-month into 1..=5: days 1-7 → 1,
//!   8-14 → 2, 15-21 → 3, 22-28 → 4, 29-31 → 5. Bucket 5 holds at most
//!   three days and is empty in months with 28 days.

use chrono::{Datelike, NaiveDate, NaiveTime};

/// Weekday number, 1 = Monday .. 7 = Sunday.
pub type Weekday = u8;

/// Week-of-month bucket, 1..=5.
pub type WeekOfMonth = u8;

/// Returns the weekday of a date (1 = Monday .. 7 = Sunday).
#[inline]
pub fn weekday_of(date: NaiveDate) -> Weekday {
    date.weekday().number_from_monday() as Weekday
}

/// Returns the week-of-month bucket of a date (1..=5).
#[inline]
pub fn week_of_month(date: NaiveDate) -> WeekOfMonth {
    ((date.day() - 1) / 7 + 1) as WeekOfMonth
}

/// Whether two same-day time intervals intersect.
///
/// Overlap is `a.start < b.end && b.start < a.end`; intervals that only
/// touch at a boundary do not overlap.
#[inline]
pub fn times_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_weekday_numbering() {
        // 2025-06-02 is a Monday
        assert_eq!(weekday_of(d(2025, 6, 2)), 1);
        assert_eq!(weekday_of(d(2025, 6, 6)), 5);
        // 2025-06-08 is a Sunday
        assert_eq!(weekday_of(d(2025, 6, 8)), 7);
    }

    #[test]
    fn test_week_of_month_buckets() {
        assert_eq!(week_of_month(d(2025, 6, 1)), 1);
        assert_eq!(week_of_month(d(2025, 6, 7)), 1);
        assert_eq!(week_of_month(d(2025, 6, 8)), 2);
        assert_eq!(week_of_month(d(2025, 6, 14)), 2);
        assert_eq!(week_of_month(d(2025, 6, 15)), 3);
        assert_eq!(week_of_month(d(2025, 6, 22)), 4);
        assert_eq!(week_of_month(d(2025, 6, 28)), 4);
        assert_eq!(week_of_month(d(2025, 6, 29)), 5);
        assert_eq!(week_of_month(d(2025, 6, 30)), 5);
        assert_eq!(week_of_month(d(2025, 5, 31)), 5);
    }

    #[test]
    fn test_week_of_month_bucket_five_empty_in_short_february() {
        // February 2025 has 28 days; no date reaches bucket 5.
        let feb = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let mut day = feb;
        while day.month() == 2 {
            assert!(week_of_month(day) <= 4, "unexpected bucket for {day}");
            day = day.succ_opt().unwrap();
        }
        // Leap February does reach bucket 5 on day 29.
        assert_eq!(week_of_month(d(2024, 2, 29)), 5);
    }

    #[test]
    fn test_times_overlap() {
        assert!(times_overlap(t(9, 0), t(10, 0), t(9, 30), t(10, 30)));
        assert!(times_overlap(t(9, 0), t(12, 0), t(10, 0), t(11, 0)));
        // Touching at the boundary is not an overlap.
        assert!(!times_overlap(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(!times_overlap(t(9, 0), t(10, 0), t(11, 0), t(12, 0)));
    }
}
