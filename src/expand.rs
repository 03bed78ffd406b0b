//! Session expansion from weekly templates.
//!
//! Materializes concrete sessions from weekly templates over a date
//! range. A pure function over rules and calendar: identical inputs
//! produce a byte-identical session sequence.
//!
//! Session ids follow `YYYYMMDD-<locationId>-<startHHMM>`; colliding ids
//! get a `-<n>` suffix with n counting up from 2.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};

use crate::error::{PlanError, PlanResult};
use crate::models::{calendar, Location, Room, Session, Weekday};

/// A weekly recurring session template.
#[derive(Debug, Clone)]
pub struct WeeklyTemplate {
    /// Weekday the session recurs on (1 = Monday .. 7 = Sunday).
    pub weekday: Weekday,
    /// Location of the generated sessions.
    pub location_id: String,
    /// Slot start; falls back to the location's default start-of-day.
    pub start_time: Option<NaiveTime>,
    /// Slot end; falls back to the location's default end-of-day.
    pub end_time: Option<NaiveTime>,
    /// Required skill for the generated sessions.
    pub required_skill: Option<String>,
    /// Room label; when absent and the location has exactly one room,
    /// that room is filled in.
    pub room: Option<String>,
}

impl WeeklyTemplate {
    /// Creates a template for a weekday and location.
    pub fn new(weekday: Weekday, location_id: impl Into<String>) -> Self {
        Self {
            weekday,
            location_id: location_id.into(),
            start_time: None,
            end_time: None,
            required_skill: None,
            room: None,
        }
    }

    /// Sets explicit slot times.
    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Sets the required skill.
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skill = Some(skill.into().to_lowercase());
        self
    }

    /// Sets the room label.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }
}

/// Expands weekly templates into concrete sessions for `[from, to]`.
///
/// Output is ordered by date ascending, then template order. Templates
/// referencing unknown locations, or resolving to an empty time window,
/// are rejected.
pub fn expand_sessions(
    templates: &[WeeklyTemplate],
    locations: &[Location],
    rooms: &[Room],
    from: NaiveDate,
    to: NaiveDate,
) -> PlanResult<Vec<Session>> {
    let location_by_id: HashMap<&str, &Location> =
        locations.iter().map(|l| (l.id.as_str(), l)).collect();
    let mut rooms_by_location: HashMap<&str, Vec<&Room>> = HashMap::new();
    for room in rooms {
        rooms_by_location
            .entry(room.location_id.as_str())
            .or_default()
            .push(room);
    }

    let mut sessions: Vec<Session> = Vec::new();
    let mut used_ids: HashSet<String> = HashSet::new();

    let mut day = from;
    while day <= to {
        let weekday = calendar::weekday_of(day);
        for (template_no, template) in templates.iter().enumerate() {
            if template.weekday != weekday {
                continue;
            }
            let location = location_by_id.get(template.location_id.as_str()).ok_or_else(|| {
                PlanError::InputInconsistent {
                    source_name: "weekly_templates".to_string(),
                    row: template_no + 1,
                    reason: format!("unknown location_id '{}'", template.location_id),
                }
            })?;

            let start = template.start_time.or(location.default_start_time).ok_or_else(|| {
                template_error(template_no, "start_time", "no start time and no location default")
            })?;
            let end = template.end_time.or(location.default_end_time).ok_or_else(|| {
                template_error(template_no, "end_time", "no end time and no location default")
            })?;
            if start >= end {
                return Err(template_error(
                    template_no,
                    "end_time",
                    format!("end {end} is not after start {start}"),
                ));
            }

            let base_id = format!(
                "{}-{}-{}",
                day.format("%Y%m%d"),
                template.location_id,
                start.format("%H%M")
            );
            let id = dedup_id(base_id, &mut used_ids);

            let room = template.room.clone().or_else(|| {
                match rooms_by_location.get(template.location_id.as_str()) {
                    Some(rooms) if rooms.len() == 1 => Some(rooms[0].name.clone()),
                    _ => None,
                }
            });

            let mut session = Session::new(id, day, &template.location_id, start, end);
            if let Some(skill) = &template.required_skill {
                session = session.with_required_skill(skill.clone());
            }
            if let Some(room) = room {
                session = session.with_room(room);
            }
            sessions.push(session);
        }
        day = day
            .succ_opt()
            .ok_or_else(|| PlanError::Internal("date range overflow".to_string()))?;
    }

    Ok(sessions)
}

fn template_error(template_no: usize, column: &str, reason: impl Into<String>) -> PlanError {
    PlanError::InputMalformed {
        source_name: "weekly_templates".to_string(),
        row: template_no + 1,
        column: column.to_string(),
        reason: reason.into(),
    }
}

fn dedup_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
