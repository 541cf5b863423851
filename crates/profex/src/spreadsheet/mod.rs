//! Workbook input and output.
//!
//! The input side parses the first sheet of an `.xlsx`/`.xls` workbook into
//! CSV-like text for the extraction prompt. The output side assembles the
//! consolidated export workbook as a minimal OOXML package with a single
//! inline-string sheet.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::SpreadsheetError;
pub use reader::{read_to_text, SpreadsheetFormat};
pub use writer::{default_export_filename, write_records, write_sheet, EXPORT_SHEET_NAME};
