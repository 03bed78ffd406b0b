//! Schedule CSV export.

use std::io::Write;
use std::path::Path;

use crate::error::{PlanError, PlanResult};
use crate::models::Schedule;

const HEADERS: [&str; 10] = [
    "session_id",
    "date",
    "start_time",
    "end_time",
    "location_id",
    "room",
    "required_skill",
    "doctor_id",
    "doctor_name",
    "preference_score",
];

/// Writes the schedule as CSV to a path, creating parent directories.
pub fn write_schedule_csv(path: impl AsRef<Path>, schedule: &Schedule) -> PlanResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlanError::Internal(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
    }
    let file = std::fs::File::create(path)
        .map_err(|e| PlanError::Internal(format!("cannot create {}: {e}", path.display())))?;
    write_schedule(file, schedule)
}

/// Writes the schedule as CSV to any writer.
pub fn write_schedule<W: Write>(writer: W, schedule: &Schedule) -> PlanResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(HEADERS)
        .map_err(|e| PlanError::Internal(format!("csv write failed: {e}")))?;

    for row in &schedule.rows {
        csv_writer
            .write_record([
                row.session_id.as_str(),
                &row.date.format("%Y-%m-%d").to_string(),
                &row.start_time.format("%H:%M").to_string(),
                &row.end_time.format("%H:%M").to_string(),
                row.location_id.as_str(),
                row.room.as_deref().unwrap_or(""),
                row.required_skill.as_deref().unwrap_or(""),
                row.physician_id.as_deref().unwrap_or(""),
                row.physician_name.as_deref().unwrap_or(""),
                &row.preference_score.to_string(),
            ])
            .map_err(|e| PlanError::Internal(format!("csv write failed: {e}")))?;
    }
    csv_writer
        .flush()
        .map_err(|e| PlanError::Internal(format!("csv write failed: {e}")))?;
    Ok(())
}
