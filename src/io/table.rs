//! Raw tabular input.
//!
//! [`RawTable`] is the common shape behind CSV files and Excel sheets:
//! a header row plus string cells, tagged with a source label for error
//! reporting. Readers address columns by header name, so column order in
//! the input never matters.

use std::io::Read;
use std::path::Path;

use crate::error::{PlanError, PlanResult};

/// An untyped table: headers and string rows from one source.
#[derive(Debug, Clone)]
pub struct RawTable {
    source: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a table from pre-split cells (Excel sheets, tests).
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// Reads a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = std::fs::File::open(path).map_err(|e| PlanError::InputMalformed {
            source_name: source.clone(),
            row: 0,
            column: String::new(),
            reason: format!("cannot open {}: {e}", path.display()),
        })?;
        Self::from_csv_reader(file, source)
    }

    /// Reads CSV data from any reader, labeled with a source name.
    pub fn from_csv_reader<R: Read>(reader: R, source: impl Into<String>) -> PlanResult<Self> {
        let source = source.into();
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| PlanError::InputMalformed {
                source_name: source.clone(),
                row: 0,
                column: String::new(),
                reason: format!("cannot read header row: {e}"),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| PlanError::InputMalformed {
                source_name: source.clone(),
                row: i + 1,
                column: String::new(),
                reason: format!("unreadable row: {e}"),
            })?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self {
            source,
            headers,
            rows,
        })
    }

    /// Source label used in error messages.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by header name, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a required column; missing columns are a header-level
    /// `InputMalformed`.
    pub fn require_column(&self, name: &str) -> PlanResult<usize> {
        self.column(name).ok_or_else(|| PlanError::InputMalformed {
            source_name: self.source.clone(),
            row: 0,
            column: name.to_string(),
            reason: "missing required column".to_string(),
        })
    }

    /// Iterates over data rows with 1-based row numbers.
    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().enumerate().map(|(i, cells)| RowView {
            source: &self.source,
            number: i + 1,
            cells,
        })
    }
}

/// One data row of a [`RawTable`].
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    source: &'a str,
    number: usize,
    cells: &'a [String],
}

impl<'a> RowView<'a> {
    /// Source label of the parent table.
    pub fn source(&self) -> &str {
        self.source
    }

    /// 1-based data row number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Trimmed cell at a column index; short rows read as empty cells.
    pub fn get(&self, column: usize) -> &'a str {
        self.cells.get(column).map(|c| c.trim()).unwrap_or("")
    }

    /// Builds a malformed-row error for a named column.
    pub fn malformed(&self, column: &str, reason: impl Into<String>) -> PlanError {
        PlanError::InputMalformed {
            source_name: self.source.to_string(),
            row: self.number,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    /// Builds an inconsistency error for this row.
    pub fn inconsistent(&self, reason: impl Into<String>) -> PlanError {
        PlanError::InputInconsistent {
            source_name: self.source.to_string(),
            row: self.number,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
b_col,a_col
1,x
2,
";

    #[test]
    fn test_from_csv_reader() {
        let table = RawTable::from_csv_reader(CSV.as_bytes(), "test.csv").unwrap();
        assert_eq!(table.source(), "test.csv");
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("a_col"), Some(1));
        assert_eq!(table.column("b_col"), Some(0));
        assert!(table.column("missing").is_none());

        let rows: Vec<_> = table.iter_rows().collect();
        assert_eq!(rows[0].number(), 1);
        assert_eq!(rows[0].get(0), "1");
        assert_eq!(rows[0].get(1), "x");
        assert_eq!(rows[1].get(1), "");
    }

    #[test]
    fn test_require_column_missing() {
        let table = RawTable::from_csv_reader(CSV.as_bytes(), "test.csv").unwrap();
        let err = table.require_column("c_col").unwrap_err();
        match err {
            PlanError::InputMalformed { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "c_col");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = RawTable::new(
            "sheet",
            vec!["a".into(), "b".into()],
            vec![vec!["only".into()]],
        );
        let row = table.iter_rows().next().unwrap();
        assert_eq!(row.get(0), "only");
        assert_eq!(row.get(1), "");
    }

    #[test]
    fn test_headers_trimmed() {
        let table = RawTable::from_csv_reader(" a , b \n1,2\n".as_bytes(), "t.csv").unwrap();
        assert_eq!(table.column("a"), Some(0));
        assert_eq!(table.column("b"), Some(1));
    }
}
