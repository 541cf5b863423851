//! Workbook parsing into prompt text.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::error::{Result, SpreadsheetError};

/// Workbook formats accepted on the input side.
///
/// Detection from a guessed MIME type is advisory only; [`read_to_text`]
/// probes the actual bytes, so a mislabeled file still parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
}

impl SpreadsheetFormat {
    /// Matches the MIME types the input side accepts.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Xlsx)
            }
            "application/vnd.ms-excel" => Some(Self::Xls),
            _ => None,
        }
    }
}

/// Parses workbook bytes and renders the first sheet as CSV-like text.
///
/// Only the first sheet is read; handover forms put everything there and
/// later sheets are ignored. An empty first sheet yields an empty string,
/// which is still valid extraction input.
pub fn read_to_text(bytes: &[u8]) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoSheets)??;

    let mut text = String::new();
    for (index, row) in range.rows().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        for (column, cell) in row.iter().enumerate() {
            if column > 0 {
                text.push(',');
            }
            append_csv_field(&mut text, &cell_to_string(cell));
        }
    }
    Ok(text)
}

/// Renders one cell as text the way a CSV export would.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::Error(error) => error.to_string(),
        Data::DateTime(value) => match value.as_datetime() {
            // Whole serial numbers are date-only cells
            Some(datetime) if value.as_f64().fract() == 0.0 => datetime.date().to_string(),
            Some(datetime) => datetime.to_string(),
            None => value.as_f64().to_string(),
        },
        Data::DateTimeIso(value) => value.clone(),
        Data::DurationIso(value) => value.clone(),
    }
}

/// Appends a field, quoting per RFC 4180 when it contains a delimiter,
/// a quote, or a line break.
fn append_csv_field(out: &mut String, value: &str) {
    if value.contains(['"', ',', '\n', '\r']) {
        out.push('"');
        for c in value.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
    } else {
        out.push_str(value);
    }
}
