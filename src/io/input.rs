//! Assembled planning input.
//!
//! [`PlanningInput`] is the product of input normalization: entity arenas
//! plus the rule tables re-keyed to arena indices. String ids stop here;
//! feasibility, model building, and diagnostics all work with `usize`
//! indices into the arenas.

use std::collections::{BTreeSet, HashMap};

use crate::error::{PlanError, PlanResult};
use crate::models::{
    Location, Physician, PreferenceTable, Room, Session, TravelTimes, WeekRule, Weekday,
    WeekOfMonth, WorkdayRules,
};

/// Fully normalized, index-keyed input for one planning run.
#[derive(Debug, Clone)]
pub struct PlanningInput {
    /// Physician arena.
    pub physicians: Vec<Physician>,
    /// Location arena.
    pub locations: Vec<Location>,
    /// Rooms (metadata only).
    pub rooms: Vec<Room>,
    /// Session arena, in input order.
    pub sessions: Vec<Session>,
    /// Per-session location index into `locations`.
    pub session_location: Vec<usize>,
    /// (physician index, location index) → preference score.
    pub preference_scores: HashMap<(usize, usize), i64>,
    /// Travel-time matrix, preserved for diagnostics only.
    pub travel_times: TravelTimes,
    /// Per-physician workday set; `None` = all weekdays allowed.
    pub workdays: Vec<Option<BTreeSet<Weekday>>>,
    /// (physician index, week-of-month, weekday) → required location index.
    pub week_rules: HashMap<(usize, WeekOfMonth, Weekday), usize>,

    physician_index: HashMap<String, usize>,
    location_index: HashMap<String, usize>,
}

impl PlanningInput {
    /// Assembles the arenas from normalized entities.
    ///
    /// The readers have already enforced uniqueness and reference
    /// validity, so a dangling id here is an internal error.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        physicians: Vec<Physician>,
        locations: Vec<Location>,
        rooms: Vec<Room>,
        sessions: Vec<Session>,
        preferences: PreferenceTable,
        travel_times: TravelTimes,
        workday_rules: WorkdayRules,
        week_rules: Vec<WeekRule>,
    ) -> PlanResult<Self> {
        let physician_index: HashMap<String, usize> = physicians
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let location_index: HashMap<String, usize> = locations
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id.clone(), i))
            .collect();

        let lookup_location = |id: &str| -> PlanResult<usize> {
            location_index
                .get(id)
                .copied()
                .ok_or_else(|| PlanError::Internal(format!("unresolved location id '{id}'")))
        };
        let lookup_physician = |id: &str| -> PlanResult<usize> {
            physician_index
                .get(id)
                .copied()
                .ok_or_else(|| PlanError::Internal(format!("unresolved physician id '{id}'")))
        };

        let session_location = sessions
            .iter()
            .map(|s| lookup_location(&s.location_id))
            .collect::<PlanResult<Vec<_>>>()?;

        let mut preference_scores = HashMap::new();
        for ((physician_id, location_id), score) in preferences.iter() {
            let key = (lookup_physician(physician_id)?, lookup_location(location_id)?);
            preference_scores.insert(key, *score);
        }

        let mut workdays: Vec<Option<BTreeSet<Weekday>>> = vec![None; physicians.len()];
        for (idx, physician) in physicians.iter().enumerate() {
            if let Some(days) = workday_rules.for_physician(&physician.id) {
                if !days.is_empty() {
                    workdays[idx] = Some(days.clone());
                }
            }
        }

        let mut week_rule_index = HashMap::new();
        for rule in &week_rules {
            let key = (
                lookup_physician(&rule.physician_id)?,
                rule.week_of_month,
                rule.weekday,
            );
            week_rule_index.insert(key, lookup_location(&rule.location_id)?);
        }

        Ok(Self {
            physicians,
            locations,
            rooms,
            sessions,
            session_location,
            preference_scores,
            travel_times,
            workdays,
            week_rules: week_rule_index,
            physician_index,
            location_index,
        })
    }

    /// Number of physicians.
    pub fn physician_count(&self) -> usize {
        self.physicians.len()
    }

    /// Number of sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Arena index of a physician id.
    pub fn physician_idx(&self, id: &str) -> Option<usize> {
        self.physician_index.get(id).copied()
    }

    /// Arena index of a location id.
    pub fn location_idx(&self, id: &str) -> Option<usize> {
        self.location_index.get(id).copied()
    }

    /// Preference score for (physician, location) indices, if a row exists.
    pub fn preference(&self, physician: usize, location: usize) -> Option<i64> {
        self.preference_scores.get(&(physician, location)).copied()
    }

    /// Rooms registered for a location index.
    pub fn rooms_at(&self, location: usize) -> Vec<&Room> {
        let id = &self.locations[location].id;
        self.rooms.iter().filter(|r| &r.location_id == id).collect()
    }
}
