//! Structured field extraction via the Gemini API.
//!
//! One extraction call covers one handover form: the sheet text goes out
//! with a fixed response schema and the reply comes back as JSON matching
//! [`ProfileFields`](crate::record::ProfileFields). The [`FieldExtractor`]
//! trait is the seam; batch code depends on it rather than on the
//! concrete client.

pub mod client;
pub mod error;
pub mod schema;

use async_trait::async_trait;

use crate::record::ProfileFields;

pub use client::GeminiExtractor;
pub use error::ExtractionError;
pub use schema::{DEFAULT_MODEL, MAX_INPUT_CHARS};

/// Extracts structured profile fields from one form's sheet text.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, csv_data: &str) -> error::Result<ProfileFields>;
}
