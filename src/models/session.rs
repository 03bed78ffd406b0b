//! Session model.
//!
//! A session is one clinical slot at one location within one day, needing
//! exactly one assigned physician. Sessions are the unit the constraint
//! model assigns; they come either directly from the sessions table or
//! from weekly-template expansion.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::calendar::{self, Weekday, WeekOfMonth};

/// A scheduled clinical slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    /// Calendar day of the session.
    pub date: NaiveDate,
    /// Location where the session takes place.
    pub location_id: String,
    /// Start of the slot (same-day).
    pub start_time: NaiveTime,
    /// End of the slot; always after `start_time`.
    pub end_time: NaiveTime,
    /// Skill the assigned physician must have, lowercase. `None` = any.
    pub required_skill: Option<String>,
    /// Optional room label.
    pub room: Option<String>,
}

impl Session {
    /// Creates a session.
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        location_id: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            location_id: location_id.into(),
            start_time,
            end_time,
            required_skill: None,
            room: None,
        }
    }

    /// Sets the required skill (stored lowercase).
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skill = Some(skill.into().to_lowercase());
        self
    }

    /// Sets the room label.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Weekday of the session (1 = Monday .. 7 = Sunday).
    #[inline]
    pub fn weekday(&self) -> Weekday {
        calendar::weekday_of(self.date)
    }

    /// Week-of-month bucket of the session (1..=5).
    #[inline]
    pub fn week_of_month(&self) -> WeekOfMonth {
        calendar::week_of_month(self.date)
    }

    /// Whether this session overlaps another in time on the same day.
    ///
    /// Sessions on different dates never overlap; boundary contact does
    /// not count as overlap.
    pub fn overlaps(&self, other: &Session) -> bool {
        self.date == other.date
            && calendar::times_overlap(
                self.start_time,
                self.end_time,
                other.start_time,
                other.end_time,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn session(id: &str, day: u32, start: NaiveTime, end: NaiveTime) -> Session {
        Session::new(
            id,
            NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            "L1",
            start,
            end,
        )
    }

    #[test]
    fn test_session_builder() {
        let s = session("S1", 10, t(9, 0), t(12, 0))
            .with_required_skill("Cardio")
            .with_room("Spreekkamer 1");

        assert_eq!(s.required_skill.as_deref(), Some("cardio"));
        assert_eq!(s.room.as_deref(), Some("Spreekkamer 1"));
        // 2025-06-10 is a Tuesday in week-of-month bucket 2.
        assert_eq!(s.weekday(), 2);
        assert_eq!(s.week_of_month(), 2);
    }

    #[test]
    fn test_overlap_same_day_only() {
        let a = session("A", 10, t(9, 0), t(10, 0));
        let b = session("B", 10, t(9, 30), t(10, 30));
        let c = session("C", 10, t(10, 0), t(11, 0));
        let d = session("D", 11, t(9, 0), t(10, 0));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacency allowed
        assert!(!a.overlaps(&d)); // different day
    }
}
