use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::secrets::SecretError;
use crate::spreadsheet::SpreadsheetError;

/// Top-level error type for profex operations.
#[derive(Debug, Error)]
pub enum ProfexError {
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for profex operations.
pub type Result<T> = std::result::Result<T, ProfexError>;
