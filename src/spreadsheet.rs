//! Spreadsheet reader: turns the first worksheet of an xlsx workbook into
//! plain string records, one per data row.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::error::ParseError;

/// One spreadsheet row: an ordered mapping from column name to cell value.
/// All values are carried as strings, the way the documents consume them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    row: usize,
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(row: usize, fields: Vec<(String, String)>) -> Self {
        Self { row, fields }
    }

    /// 1-based worksheet row this record was read from (the header is row 1).
    /// Stays accurate when blank rows in between were dropped.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Looks a field up by column name. Missing and empty are distinct:
    /// an empty cell yields `Some("")`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.trim().is_empty())
    }
}

/// Reads all data rows of the workbook's first worksheet.
///
/// The header row defines field names; blank rows are skipped. Re-reading an
/// unmodified file yields the same records in the same order.
pub fn read_records(path: &Path) -> Result<Vec<Record>, ParseError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| ParseError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::NoWorksheet(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::Worksheet {
            path: path.to_path_buf(),
            sheet: sheet_name.clone(),
            source: e,
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Err(ParseError::MissingHeader(path.to_path_buf())),
    };
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::MissingHeader(path.to_path_buf()));
    }

    let mut records = Vec::new();
    for (row_index, row) in rows.enumerate() {
        let fields: Vec<(String, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.trim().is_empty())
            .map(|(col, header)| {
                let value = row.get(col).map(cell_to_string).unwrap_or_default();
                (header.clone(), value)
            })
            .collect();

        let record = Record::new(row_index + 2, fields);
        if record.is_blank() {
            debug!(row = record.row(), "Skipping blank row");
            continue;
        }
        records.push(record);
    }

    info!(
        path = %path.display(),
        sheet = %sheet_name,
        records = records.len(),
        "Read records from workbook"
    );
    Ok(records)
}

/// Stringifies a cell the way the rendered documents expect: integral floats
/// without the trailing `.0`, datetimes as `dd-mm-YYYY`, empty cells as "".
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.trim().to_string(),
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => format_date(datetime),
            None => {
                warn!(raw = value.as_f64(), "Unrepresentable datetime cell");
                value.as_f64().to_string()
            }
        },
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Date cells render as `dd-mm-YYYY`; the time of day is dropped.
fn format_date(datetime: NaiveDateTime) -> String {
    datetime.format("%d-%m-%Y").to_string()
}
