//! Schedule materialization.
//!
//! Turns the solver's assignment back into a typed [`Schedule`]: one row
//! per input session — structurally infeasible ones included, with an
//! empty assignment — sorted by (date, start, session id). The summed
//! per-row contributions are cross-checked against the solver's reported
//! objective; a mismatch means a bug, not bad input.

use crate::error::{PlanError, PlanResult};
use crate::io::PlanningInput;
use crate::models::{Schedule, ScheduleRow};

use super::driver::RosterAssignment;

/// Materializes the final schedule from an assignment.
pub fn materialize(
    input: &PlanningInput,
    assignment: &RosterAssignment,
    default_score: i64,
) -> PlanResult<Schedule> {
    let mut rows: Vec<ScheduleRow> = Vec::with_capacity(input.session_count());

    for (session_idx, session) in input.sessions.iter().enumerate() {
        let assigned = assignment.by_session[session_idx];
        let preference_score = match assigned {
            Some(physician) => {
                let location = input.session_location[session_idx];
                input
                    .preference(physician, location)
                    .unwrap_or(default_score)
            }
            None => 0,
        };
        rows.push(ScheduleRow {
            session_id: session.id.clone(),
            date: session.date,
            start_time: session.start_time,
            end_time: session.end_time,
            location_id: session.location_id.clone(),
            room: session.room.clone(),
            required_skill: session.required_skill.clone(),
            physician_id: assigned.map(|p| input.physicians[p].id.clone()),
            physician_name: assigned.map(|p| input.physicians[p].name.clone()),
            preference_score,
        });
    }

    rows.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.start_time.cmp(&b.start_time))
            .then(a.session_id.cmp(&b.session_id))
    });

    let total_score: i64 = rows.iter().map(|r| r.preference_score).sum();
    if total_score != assignment.objective {
        return Err(PlanError::Internal(format!(
            "materialized total {total_score} does not match solver objective {}",
            assignment.objective
        )));
    }

    Ok(Schedule { rows, total_score })
}
