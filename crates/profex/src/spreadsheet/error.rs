//! Spreadsheet read/write error types.

use thiserror::Error;

/// Errors that can occur while reading or building workbooks.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// The bytes could not be parsed in any supported workbook format.
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// The workbook has no sheets to read.
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// Assembly of the output workbook failed.
    #[error("Failed to build workbook: {0}")]
    Build(String),
}

/// Result type for spreadsheet operations.
pub type Result<T> = std::result::Result<T, SpreadsheetError>;
