use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};

use crate::sweep::error::{Result, SweepError};

/// Extensions accepted as report spreadsheets, compared case-insensitively.
pub const REPORT_EXTENSIONS: &[&str] = &["xls", "xlsx"];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether `path` names a spreadsheet the extractor will attempt to read.
pub fn is_report(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| REPORT_EXTENSIONS.contains(&ext.as_str()))
}

/// Reads the first column of the first worksheet of a report.
///
/// Returns one token per non-empty cell, in row order. When `header_row` is
/// set the first row of the used range is treated as a column heading and
/// left out.
pub fn read_tokens(path: &Path, header_row: bool) -> Result<Vec<String>> {
    if !is_report(path) {
        return Err(SweepError::UnsupportedReport(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweepError::InvalidWorkbook("workbook has no worksheets".into()))??;

    Ok(first_column_tokens(&range, header_row))
}

fn first_column_tokens(range: &Range<DataType>, header_row: bool) -> Vec<String> {
    // The used range starts at its first populated cell; if that is not in
    // column A the first column is blank.
    match range.start() {
        Some((_, 0)) => {}
        _ => return Vec::new(),
    }

    range
        .rows()
        .skip(usize::from(header_row))
        .map(|row| cell_to_string(row.first()))
        .filter(|value| !value.is_empty())
        .collect()
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::DateTime(serial) => {
            excel_datetime(*serial).unwrap_or_else(|| serial.to_string())
        }
        DataType::Error(_) | DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Renders an Excel serial date (days since 1899-12-30) as a timestamp.
fn excel_datetime(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let stamp = epoch.checked_add_signed(Duration::milliseconds(millis))?;
    Some(stamp.format(DATETIME_FORMAT).to_string())
}
