//! Physician model.
//!
//! Physicians are the resources a roster assigns: each carries a monthly
//! session cap, blocked dates, and a skill set. Cadence rules (fixed
//! workdays, week-of-month location rules) live in [`super::rules`] and
//! reference physicians by id.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A physician that can be assigned to sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Physician {
    /// Unique physician identifier.
    pub id: String,
    /// Display name; falls back to the id when blank in the input.
    pub name: String,
    /// Maximum number of sessions over the planning horizon.
    pub max_sessions: u32,
    /// Dates on which the physician cannot be scheduled.
    pub unavailable_dates: BTreeSet<NaiveDate>,
    /// Skills, lowercase. Empty = no special skills.
    pub skills: BTreeSet<String>,
}

impl Physician {
    /// Creates a physician with the given id (name defaults to the id).
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            max_sessions: 0,
            unavailable_dates: BTreeSet::new(),
            skills: BTreeSet::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the monthly session cap.
    pub fn with_max_sessions(mut self, max_sessions: u32) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Adds an unavailable date.
    pub fn with_unavailable(mut self, date: NaiveDate) -> Self {
        self.unavailable_dates.insert(date);
        self
    }

    /// Adds a skill (stored lowercase).
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into().to_lowercase());
        self
    }

    /// Whether the physician is blocked on a date.
    pub fn is_unavailable_on(&self, date: NaiveDate) -> bool {
        self.unavailable_dates.contains(&date)
    }

    /// Whether the physician has a given skill (case-insensitive).
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(&skill.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_physician_builder() {
        let p = Physician::new("D1")
            .with_name("Dr. de Vries")
            .with_max_sessions(8)
            .with_unavailable(d(2025, 6, 12))
            .with_skill("Cardio");

        assert_eq!(p.id, "D1");
        assert_eq!(p.name, "Dr. de Vries");
        assert_eq!(p.max_sessions, 8);
        assert!(p.is_unavailable_on(d(2025, 6, 12)));
        assert!(!p.is_unavailable_on(d(2025, 6, 13)));
        assert!(p.has_skill("cardio"));
        assert!(p.has_skill("CARDIO"));
        assert!(!p.has_skill("algemeen"));
    }

    #[test]
    fn test_name_defaults_to_id() {
        let p = Physician::new("D2");
        assert_eq!(p.name, "D2");
    }
}
