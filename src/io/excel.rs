//! Excel workbook input.
//!
//! Loads an `.xlsx` workbook whose tabs mirror the CSV schemas and turns
//! each sheet into a [`RawTable`], so normalization is identical for both
//! input formats.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Datelike, Timelike};

use crate::error::{PlanError, PlanResult};

use super::table::RawTable;

/// Reads every sheet of a workbook into raw tables keyed by sheet name.
pub fn read_workbook(path: impl AsRef<Path>) -> PlanResult<HashMap<String, RawTable>> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| PlanError::InputMalformed {
        source_name: file_name.clone(),
        row: 0,
        column: String::new(),
        reason: format!("cannot open workbook {}: {e}", path.display()),
    })?;

    let mut tables = HashMap::new();
    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| PlanError::InputMalformed {
                source_name: format!("{file_name}#{sheet}"),
                row: 0,
                column: String::new(),
                reason: format!("cannot read sheet: {e}"),
            })?;

        let mut rows = range.rows().map(|r| r.iter().map(cell_to_string).collect());
        let headers: Vec<String> = rows.next().unwrap_or_default();
        let data: Vec<Vec<String>> = rows.collect();
        tables.insert(
            sheet.clone(),
            RawTable::new(format!("{file_name}#{sheet}"), headers, data),
        );
    }
    Ok(tables)
}

/// Renders a cell the way the CSV readers expect to see it.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        // Excel stores times as day fractions anchored before 1900-01-01.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.date().year() < 1900 => ndt.format("%H:%M").to_string(),
            Some(ndt) if ndt.time().num_seconds_from_midnight() == 0 => {
                ndt.format("%Y-%m-%d").to_string()
            }
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M").to_string(),
            None => String::new(),
        },
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
    }
}
