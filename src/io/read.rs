//! Typed readers for the input tables.
//!
//! Each reader takes a [`RawTable`] and produces domain entities, failing
//! fast on malformed cells. Cross-table policy follows the error design:
//! a session referencing an unknown location is fatal, while ancillary
//! rows (preferences, travel times, workday/week rules, rooms) with
//! unknown references are skipped with a warning.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::error::PlanResult;
use crate::models::{
    Location, Physician, PreferenceTable, Room, Session, TravelTimes, WeekRule, WorkdayRules,
};

use super::parse;
use super::table::RawTable;

/// Reads `doctors.csv` / the `Doctors` sheet.
pub fn read_physicians(table: &RawTable) -> PlanResult<Vec<Physician>> {
    let id_col = table.require_column("doctor_id")?;
    let name_col = table.require_column("name")?;
    let max_col = table.require_column("max_sessions")?;
    let unavailable_col = table.require_column("unavailable_dates")?;
    let skills_col = table.require_column("skills")?;

    let mut physicians: Vec<Physician> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for row in table.iter_rows() {
        let id = row.get(id_col);
        if id.is_empty() {
            warn!("{} row {}: blank doctor_id, row skipped", row.source(), row.number());
            continue;
        }
        if !seen.insert(id.to_string()) {
            return Err(row.inconsistent(format!("duplicate doctor_id '{id}'")));
        }

        let max_sessions = parse::parse_u32(row.get(max_col))
            .map_err(|reason| row.malformed("max_sessions", reason))?;

        let mut physician = Physician::new(id).with_max_sessions(max_sessions);
        let name = row.get(name_col);
        if !name.is_empty() {
            physician = physician.with_name(name);
        }
        for token in parse::split_tokens(row.get(unavailable_col)) {
            let date = parse::parse_date(&token)
                .map_err(|reason| row.malformed("unavailable_dates", reason))?;
            physician = physician.with_unavailable(date);
        }
        for skill in parse::split_tokens(row.get(skills_col)) {
            physician = physician.with_skill(skill);
        }
        physicians.push(physician);
    }
    Ok(physicians)
}

/// Reads `locations.csv` / the `Locations` sheet.
pub fn read_locations(table: &RawTable) -> PlanResult<Vec<Location>> {
    let id_col = table.require_column("location_id")?;
    let name_col = table.require_column("name")?;
    let start_col = table.require_column("default_start_time")?;
    let end_col = table.require_column("default_end_time")?;

    let mut locations: Vec<Location> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for row in table.iter_rows() {
        let id = row.get(id_col);
        if id.is_empty() {
            warn!("{} row {}: blank location_id, row skipped", row.source(), row.number());
            continue;
        }
        if !seen.insert(id.to_string()) {
            return Err(row.inconsistent(format!("duplicate location_id '{id}'")));
        }

        let mut location = Location::new(id);
        let name = row.get(name_col);
        if !name.is_empty() {
            location = location.with_name(name);
        }
        let start_raw = row.get(start_col);
        if !start_raw.is_empty() {
            location.default_start_time = Some(
                parse::parse_time(start_raw)
                    .map_err(|reason| row.malformed("default_start_time", reason))?,
            );
        }
        let end_raw = row.get(end_col);
        if !end_raw.is_empty() {
            location.default_end_time = Some(
                parse::parse_time(end_raw)
                    .map_err(|reason| row.malformed("default_end_time", reason))?,
            );
        }
        locations.push(location);
    }
    Ok(locations)
}

/// Reads `rooms.csv` / the `Rooms` sheet. Orphan rooms are skipped.
pub fn read_rooms(table: &RawTable, location_ids: &HashSet<String>) -> PlanResult<Vec<Room>> {
    let id_col = table.require_column("room_id")?;
    let location_col = table.require_column("location_id")?;
    let name_col = table.require_column("name")?;

    let mut rooms: Vec<Room> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_names: HashSet<(String, String)> = HashSet::new();
    for row in table.iter_rows() {
        let id = row.get(id_col);
        let location_id = row.get(location_col);
        let name = row.get(name_col);
        if id.is_empty() || name.is_empty() {
            warn!("{} row {}: blank room_id or name, row skipped", row.source(), row.number());
            continue;
        }
        if !location_ids.contains(location_id) {
            warn!(
                "{} row {}: unknown location_id '{location_id}', room '{id}' skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        if !seen_ids.insert(id.to_string()) {
            warn!("{} row {}: duplicate room_id '{id}', row skipped", row.source(), row.number());
            continue;
        }
        if !seen_names.insert((location_id.to_string(), name.to_string())) {
            warn!(
                "{} row {}: duplicate room name '{name}' at '{location_id}', row skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        rooms.push(Room::new(id, location_id, name));
    }
    Ok(rooms)
}

/// Reads `sessions.csv` / the `Sessions` sheet.
///
/// Sessions never recover row-level: blank or duplicate ids, unknown
/// locations, and inverted time windows are all fatal.
pub fn read_sessions(table: &RawTable, location_ids: &HashSet<String>) -> PlanResult<Vec<Session>> {
    let id_col = table.require_column("session_id")?;
    let date_col = table.require_column("date")?;
    let location_col = table.require_column("location_id")?;
    let start_col = table.require_column("start_time")?;
    let end_col = table.require_column("end_time")?;
    let skill_col = table.require_column("required_skill")?;
    let room_col = table.column("room");

    let mut sessions: Vec<Session> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for row in table.iter_rows() {
        let id = row.get(id_col);
        if id.is_empty() {
            return Err(row.malformed("session_id", "blank session_id"));
        }
        if !seen.insert(id.to_string()) {
            return Err(row.inconsistent(format!("duplicate session_id '{id}'")));
        }

        let date =
            parse::parse_date(row.get(date_col)).map_err(|reason| row.malformed("date", reason))?;
        let location_id = row.get(location_col);
        if !location_ids.contains(location_id) {
            return Err(row.inconsistent(format!(
                "session '{id}' references unknown location_id '{location_id}'"
            )));
        }
        let start_time = parse::parse_time(row.get(start_col))
            .map_err(|reason| row.malformed("start_time", reason))?;
        let end_time = parse::parse_time(row.get(end_col))
            .map_err(|reason| row.malformed("end_time", reason))?;
        if start_time >= end_time {
            return Err(row.malformed(
                "end_time",
                format!("end_time {end_time} is not after start_time {start_time}"),
            ));
        }

        let mut session = Session::new(id, date, location_id, start_time, end_time);
        let skill = row.get(skill_col);
        if !skill.is_empty() {
            session = session.with_required_skill(skill);
        }
        if let Some(room_col) = room_col {
            let room = row.get(room_col);
            if !room.is_empty() {
                session = session.with_room(room);
            }
        }
        sessions.push(session);
    }
    Ok(sessions)
}

/// Reads `preferences.csv` / the `Preferences` sheet.
pub fn read_preferences(
    table: &RawTable,
    physician_ids: &HashSet<String>,
    location_ids: &HashSet<String>,
) -> PlanResult<PreferenceTable> {
    let doctor_col = table.require_column("doctor_id")?;
    let location_col = table.require_column("location_id")?;
    let score_col = table.require_column("score")?;

    let mut prefs = PreferenceTable::new();
    for row in table.iter_rows() {
        let doctor_id = row.get(doctor_col);
        let location_id = row.get(location_col);
        if doctor_id.is_empty() || location_id.is_empty() {
            warn!("{} row {}: blank id, row skipped", row.source(), row.number());
            continue;
        }
        if !physician_ids.contains(doctor_id) {
            warn!(
                "{} row {}: unknown doctor_id '{doctor_id}', row skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        if !location_ids.contains(location_id) {
            warn!(
                "{} row {}: unknown location_id '{location_id}', row skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        let score =
            parse::parse_i64(row.get(score_col)).map_err(|reason| row.malformed("score", reason))?;
        if !prefs.insert(doctor_id, location_id, score) {
            warn!(
                "{} row {}: duplicate preference for ({doctor_id}, {location_id}), row skipped",
                row.source(),
                row.number()
            );
        }
    }
    Ok(prefs)
}

/// Reads `travel_times.csv` / the `TravelTimes` sheet.
pub fn read_travel_times(
    table: &RawTable,
    location_ids: &HashSet<String>,
) -> PlanResult<TravelTimes> {
    let from_col = table.require_column("from_location_id")?;
    let to_col = table.require_column("to_location_id")?;
    let minutes_col = table.require_column("minutes")?;

    let mut travel = TravelTimes::new();
    for row in table.iter_rows() {
        let from = row.get(from_col);
        let to = row.get(to_col);
        if from.is_empty() || to.is_empty() {
            warn!("{} row {}: blank location id, row skipped", row.source(), row.number());
            continue;
        }
        if !location_ids.contains(from) || !location_ids.contains(to) {
            warn!(
                "{} row {}: unknown location pair ({from}, {to}), row skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        let minutes = parse::parse_u32(row.get(minutes_col))
            .map_err(|reason| row.malformed("minutes", reason))?;
        travel.insert(from, to, minutes);
    }
    Ok(travel)
}

/// Reads `doctor_workdays.csv` / the `DoctorWorkdays` sheet.
pub fn read_workdays(
    table: &RawTable,
    physician_ids: &HashSet<String>,
) -> PlanResult<WorkdayRules> {
    let doctor_col = table.require_column("doctor_id")?;
    let weekday_col = table.require_column("weekday")?;

    let mut rules = WorkdayRules::new();
    for row in table.iter_rows() {
        let doctor_id = row.get(doctor_col);
        if doctor_id.is_empty() {
            warn!("{} row {}: blank doctor_id, row skipped", row.source(), row.number());
            continue;
        }
        if !physician_ids.contains(doctor_id) {
            warn!(
                "{} row {}: unknown doctor_id '{doctor_id}', row skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        let weekday = parse::parse_weekday(row.get(weekday_col))
            .map_err(|reason| row.malformed("weekday", reason))?;
        rules.add(doctor_id, weekday);
    }
    Ok(rules)
}

/// Reads `doctor_week_rules.csv` / the `DoctorWeekRules` sheet.
///
/// Identical duplicate rules are idempotent; a second rule for the same
/// (doctor, week, weekday) with a different location conflicts and is
/// skipped with a warning.
pub fn read_week_rules(
    table: &RawTable,
    physician_ids: &HashSet<String>,
    location_ids: &HashSet<String>,
) -> PlanResult<Vec<WeekRule>> {
    let doctor_col = table.require_column("doctor_id")?;
    let week_col = table.require_column("week_of_month")?;
    let weekday_col = table.require_column("weekday")?;
    let location_col = table.require_column("location_id")?;

    let mut rules: Vec<WeekRule> = Vec::new();
    let mut by_key: HashMap<(String, u8, u8), String> = HashMap::new();
    for row in table.iter_rows() {
        let doctor_id = row.get(doctor_col);
        let location_id = row.get(location_col);
        if doctor_id.is_empty() || location_id.is_empty() {
            warn!("{} row {}: blank id, row skipped", row.source(), row.number());
            continue;
        }
        if !physician_ids.contains(doctor_id) {
            warn!(
                "{} row {}: unknown doctor_id '{doctor_id}', row skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        if !location_ids.contains(location_id) {
            warn!(
                "{} row {}: unknown location_id '{location_id}', row skipped",
                row.source(),
                row.number()
            );
            continue;
        }
        let week_of_month = parse::parse_u32(row.get(week_col))
            .ok()
            .filter(|v| (1..=5).contains(v))
            .ok_or_else(|| {
                row.malformed(
                    "week_of_month",
                    format!("'{}' is not a week-of-month (1-5)", row.get(week_col)),
                )
            })? as u8;
        let weekday = parse::parse_weekday(row.get(weekday_col))
            .map_err(|reason| row.malformed("weekday", reason))?;

        let key = (doctor_id.to_string(), week_of_month, weekday);
        if let Some(existing) = by_key.get(&key) {
            if existing != location_id {
                warn!(
                    "{} row {}: conflicting week rule for ({doctor_id}, week {week_of_month}, \
                     weekday {weekday}): '{location_id}' vs existing '{existing}', row skipped",
                    row.source(),
                    row.number()
                );
            }
            // identical duplicates are idempotent
            continue;
        }
        by_key.insert(key, location_id.to_string());
        rules.push(WeekRule::new(doctor_id, week_of_month, weekday, location_id));
    }
    Ok(rules)
}
