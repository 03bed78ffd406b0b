//! Preference and cadence rule tables.
//!
//! These tables carry the soft objective (location preferences) and the
//! hard cadence rules (fixed workdays, week-of-month location rules) plus
//! the travel-time matrix. All of them reference physicians and locations
//! by string id; the planner re-keys them to arena indices during input
//! assembly.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::calendar::{Weekday, WeekOfMonth};

/// Physician-location preference scores.
///
/// Missing pairs score the configured default (0 unless overridden).
/// Scores may be negative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceTable {
    scores: HashMap<(String, String), i64>,
}

impl PreferenceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a score for (physician, location). Returns `false` when the
    /// pair was already present (the existing entry wins).
    pub fn insert(
        &mut self,
        physician_id: impl Into<String>,
        location_id: impl Into<String>,
        score: i64,
    ) -> bool {
        let key = (physician_id.into(), location_id.into());
        if self.scores.contains_key(&key) {
            return false;
        }
        self.scores.insert(key, score);
        true
    }

    /// Looks up the score for (physician, location).
    pub fn score(&self, physician_id: &str, location_id: &str) -> Option<i64> {
        self.scores
            .get(&(physician_id.to_string(), location_id.to_string()))
            .copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterates over ((physician_id, location_id), score) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &i64)> {
        self.scores.iter()
    }
}

/// Travel minutes between locations.
///
/// Ingested and preserved for diagnostics; no constraint consults it.
/// Entries are directional; lookups fall back to the reverse direction,
/// and same-location travel is always 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelTimes {
    minutes: HashMap<(String, String), u32>,
}

impl TravelTimes {
    /// Creates an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records travel minutes from one location to another.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, minutes: u32) {
        self.minutes.insert((from.into(), to.into()), minutes);
    }

    /// Looks up travel minutes, trying the reverse direction when the
    /// forward entry is absent.
    pub fn minutes_between(&self, from: &str, to: &str) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        self.minutes
            .get(&(from.to_string(), to.to_string()))
            .or_else(|| self.minutes.get(&(to.to_string(), from.to_string())))
            .copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }
}

/// Fixed workday sets per physician.
///
/// A physician with no entry may work any weekday; a physician with at
/// least one entry is eligible only on the listed weekdays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkdayRules {
    workdays: HashMap<String, BTreeSet<Weekday>>,
}

impl WorkdayRules {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a workday for a physician.
    pub fn add(&mut self, physician_id: impl Into<String>, weekday: Weekday) {
        self.workdays
            .entry(physician_id.into())
            .or_default()
            .insert(weekday);
    }

    /// Returns the workday set for a physician, if any rule exists.
    pub fn for_physician(&self, physician_id: &str) -> Option<&BTreeSet<Weekday>> {
        self.workdays.get(physician_id)
    }

    /// Whether a physician may work on a weekday under these rules.
    pub fn allows(&self, physician_id: &str, weekday: Weekday) -> bool {
        match self.workdays.get(physician_id) {
            Some(days) if !days.is_empty() => days.contains(&weekday),
            _ => true,
        }
    }
}

/// A week-of-month location rule.
///
/// A physician matching (week-of-month, weekday) may only be placed at
/// the required location that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRule {
    /// Physician the rule applies to.
    pub physician_id: String,
    /// Week-of-month bucket, 1..=5.
    pub week_of_month: WeekOfMonth,
    /// Weekday, 1 = Monday .. 7 = Sunday.
    pub weekday: Weekday,
    /// The only location allowed on matching days.
    pub location_id: String,
}

impl WeekRule {
    /// Creates a week rule.
    pub fn new(
        physician_id: impl Into<String>,
        week_of_month: WeekOfMonth,
        weekday: Weekday,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            physician_id: physician_id.into(),
            week_of_month,
            weekday,
            location_id: location_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_first_entry_wins() {
        let mut prefs = PreferenceTable::new();
        assert!(prefs.insert("D1", "L1", 5));
        assert!(!prefs.insert("D1", "L1", -2));
        assert_eq!(prefs.score("D1", "L1"), Some(5));
        assert_eq!(prefs.score("D1", "L2"), None);
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn test_travel_reverse_fallback() {
        let mut travel = TravelTimes::new();
        travel.insert("L1", "L2", 25);
        assert_eq!(travel.minutes_between("L1", "L2"), Some(25));
        assert_eq!(travel.minutes_between("L2", "L1"), Some(25));
        assert_eq!(travel.minutes_between("L1", "L1"), Some(0));
        assert_eq!(travel.minutes_between("L1", "L3"), None);
    }

    #[test]
    fn test_travel_asymmetric_entries() {
        let mut travel = TravelTimes::new();
        travel.insert("L1", "L2", 25);
        travel.insert("L2", "L1", 40);
        assert_eq!(travel.minutes_between("L1", "L2"), Some(25));
        assert_eq!(travel.minutes_between("L2", "L1"), Some(40));
    }

    #[test]
    fn test_workdays_absent_means_all() {
        let mut rules = WorkdayRules::new();
        rules.add("D1", 1);
        rules.add("D1", 3);

        assert!(rules.allows("D1", 1));
        assert!(!rules.allows("D1", 2));
        // No rule for D2: every weekday allowed.
        for wd in 1..=7 {
            assert!(rules.allows("D2", wd));
        }
    }
}
