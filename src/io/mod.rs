//! Input normalization and schedule export.
//!
//! Converts raw tables (CSV files or Excel workbook tabs) into typed
//! entities, assembling them into a [`PlanningInput`] arena. This module
//! is the only place raw strings become typed values; everything past it
//! works with typed entities and arena indices.
//!
//! Recovery policy: malformed cells are fatal; ancillary rows with
//! unknown references are skipped with a warning; session rows never
//! recover.

mod excel;
mod input;
mod parse;
mod read;
mod table;
mod write;

use std::path::Path;

use crate::error::{PlanError, PlanResult};

pub use input::PlanningInput;
pub use read::{
    read_locations, read_physicians, read_preferences, read_rooms, read_sessions,
    read_travel_times, read_week_rules, read_workdays,
};
pub use table::{RawTable, RowView};
pub use write::{write_schedule, write_schedule_csv};

use crate::models::{PreferenceTable, TravelTimes, WorkdayRules};

/// Workbook tab names, mirroring the CSV file family.
const SHEET_DOCTORS: &str = "Doctors";
const SHEET_LOCATIONS: &str = "Locations";
const SHEET_ROOMS: &str = "Rooms";
const SHEET_SESSIONS: &str = "Sessions";
const SHEET_PREFERENCES: &str = "Preferences";
const SHEET_TRAVEL_TIMES: &str = "TravelTimes";
const SHEET_WORKDAYS: &str = "DoctorWorkdays";
const SHEET_WEEK_RULES: &str = "DoctorWeekRules";

/// The raw input tables of one planning run, before normalization.
#[derive(Debug, Clone)]
pub struct InputTables {
    /// Doctors table (required).
    pub doctors: RawTable,
    /// Locations table (required).
    pub locations: RawTable,
    /// Sessions table (required).
    pub sessions: RawTable,
    /// Rooms table.
    pub rooms: Option<RawTable>,
    /// Preferences table.
    pub preferences: Option<RawTable>,
    /// Travel-times table.
    pub travel_times: Option<RawTable>,
    /// Workday rules table.
    pub doctor_workdays: Option<RawTable>,
    /// Week-of-month rules table.
    pub doctor_week_rules: Option<RawTable>,
}

impl InputTables {
    /// Loads the table family from CSV paths.
    #[allow(clippy::too_many_arguments)]
    pub fn from_csv_paths(
        doctors: &Path,
        locations: &Path,
        sessions: &Path,
        rooms: Option<&Path>,
        preferences: Option<&Path>,
        travel_times: Option<&Path>,
        doctor_workdays: Option<&Path>,
        doctor_week_rules: Option<&Path>,
    ) -> PlanResult<Self> {
        let optional = |path: Option<&Path>| -> PlanResult<Option<RawTable>> {
            path.map(RawTable::from_csv_path).transpose()
        };
        Ok(Self {
            doctors: RawTable::from_csv_path(doctors)?,
            locations: RawTable::from_csv_path(locations)?,
            sessions: RawTable::from_csv_path(sessions)?,
            rooms: optional(rooms)?,
            preferences: optional(preferences)?,
            travel_times: optional(travel_times)?,
            doctor_workdays: optional(doctor_workdays)?,
            doctor_week_rules: optional(doctor_week_rules)?,
        })
    }

    /// Loads the table family from one `.xlsx` workbook.
    ///
    /// The `Doctors`, `Locations` and `Sessions` tabs are required; the
    /// other tabs are optional, exactly like their CSV counterparts.
    pub fn from_workbook(path: &Path) -> PlanResult<Self> {
        let mut sheets = excel::read_workbook(path)?;
        let missing = |name: &str| PlanError::InputMalformed {
            source_name: path.display().to_string(),
            row: 0,
            column: String::new(),
            reason: format!("workbook has no '{name}' sheet"),
        };
        let doctors = sheets
            .remove(SHEET_DOCTORS)
            .ok_or_else(|| missing(SHEET_DOCTORS))?;
        let locations = sheets
            .remove(SHEET_LOCATIONS)
            .ok_or_else(|| missing(SHEET_LOCATIONS))?;
        let sessions = sheets
            .remove(SHEET_SESSIONS)
            .ok_or_else(|| missing(SHEET_SESSIONS))?;
        Ok(Self {
            doctors,
            locations,
            sessions,
            rooms: sheets.remove(SHEET_ROOMS),
            preferences: sheets.remove(SHEET_PREFERENCES),
            travel_times: sheets.remove(SHEET_TRAVEL_TIMES),
            doctor_workdays: sheets.remove(SHEET_WORKDAYS),
            doctor_week_rules: sheets.remove(SHEET_WEEK_RULES),
        })
    }

    /// Normalizes all tables into a [`PlanningInput`].
    pub fn normalize(&self) -> PlanResult<PlanningInput> {
        let locations = read_locations(&self.locations)?;
        let location_ids = locations.iter().map(|l| l.id.clone()).collect();
        let physicians = read_physicians(&self.doctors)?;
        let physician_ids = physicians.iter().map(|p| p.id.clone()).collect();

        let rooms = match &self.rooms {
            Some(table) => read_rooms(table, &location_ids)?,
            None => Vec::new(),
        };
        let sessions = read_sessions(&self.sessions, &location_ids)?;
        let preferences = match &self.preferences {
            Some(table) => read_preferences(table, &physician_ids, &location_ids)?,
            None => PreferenceTable::new(),
        };
        let travel_times = match &self.travel_times {
            Some(table) => read_travel_times(table, &location_ids)?,
            None => TravelTimes::new(),
        };
        let workdays = match &self.doctor_workdays {
            Some(table) => read_workdays(table, &physician_ids)?,
            None => WorkdayRules::new(),
        };
        let week_rules = match &self.doctor_week_rules {
            Some(table) => read_week_rules(table, &physician_ids, &location_ids)?,
            None => Vec::new(),
        };

        PlanningInput::assemble(
            physicians,
            locations,
            rooms,
            sessions,
            preferences,
            travel_times,
            workdays,
            week_rules,
        )
    }
}
