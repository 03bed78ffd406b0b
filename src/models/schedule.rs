//! Schedule (solution) model.
//!
//! A schedule is the materialized outcome of a planning run: one row per
//! input session, with the assigned physician and its preference-score
//! contribution. Structurally infeasible sessions keep their row with an
//! empty assignment so downstream exports see the complete horizon.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One scheduled (or unassignable) session in the final roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Session identifier.
    pub session_id: String,
    /// Session date.
    pub date: NaiveDate,
    /// Slot start.
    pub start_time: NaiveTime,
    /// Slot end.
    pub end_time: NaiveTime,
    /// Location of the session.
    pub location_id: String,
    /// Room label, if any.
    pub room: Option<String>,
    /// Required skill, if any.
    pub required_skill: Option<String>,
    /// Assigned physician id; `None` for structurally infeasible sessions.
    pub physician_id: Option<String>,
    /// Assigned physician display name.
    pub physician_name: Option<String>,
    /// Preference-score contribution of this row (0 when unassigned).
    pub preference_score: i64,
}

/// A complete roster for one planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Rows sorted by (date, start, session id).
    pub rows: Vec<ScheduleRow>,
    /// Sum of all preference-score contributions; equals the solver's
    /// reported objective.
    pub total_score: i64,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows with an assigned physician.
    pub fn assignment_count(&self) -> usize {
        self.rows.iter().filter(|r| r.physician_id.is_some()).count()
    }

    /// Number of rows without an assignment.
    pub fn unassigned_count(&self) -> usize {
        self.rows.len() - self.assignment_count()
    }

    /// Rows assigned to a given physician.
    pub fn rows_for_physician(&self, physician_id: &str) -> Vec<&ScheduleRow> {
        self.rows
            .iter()
            .filter(|r| r.physician_id.as_deref() == Some(physician_id))
            .collect()
    }

    /// Rows on a given date.
    pub fn rows_for_date(&self, date: NaiveDate) -> Vec<&ScheduleRow> {
        self.rows.iter().filter(|r| r.date == date).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(session: &str, day: u32, physician: Option<&str>, score: i64) -> ScheduleRow {
        ScheduleRow {
            session_id: session.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            location_id: "L1".to_string(),
            room: None,
            required_skill: None,
            physician_id: physician.map(str::to_string),
            physician_name: physician.map(str::to_string),
            preference_score: score,
        }
    }

    #[test]
    fn test_schedule_queries() {
        let schedule = Schedule {
            rows: vec![
                row("S1", 2, Some("D1"), 5),
                row("S2", 2, Some("D2"), 0),
                row("S3", 3, None, 0),
            ],
            total_score: 5,
        };

        assert_eq!(schedule.assignment_count(), 2);
        assert_eq!(schedule.unassigned_count(), 1);
        assert_eq!(schedule.rows_for_physician("D1").len(), 1);
        assert_eq!(
            schedule
                .rows_for_date(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
                .len(),
            2
        );
    }
}
