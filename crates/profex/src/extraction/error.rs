//! Extraction error types.

use thiserror::Error;

/// Errors that can occur while calling the extraction model.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The HTTP request failed outright (connect, timeout, TLS).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API request failed ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response carried no usable text.
    #[error("No response from AI")]
    EmptyResponse,

    /// The model's reply was not the expected JSON shape.
    #[error("Failed to parse model response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
