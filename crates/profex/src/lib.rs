pub mod batch;
pub mod error;
pub mod extraction;
pub mod record;
pub mod secrets;
pub mod spreadsheet;

pub use batch::{BatchRunner, BatchState, ProgressBroadcaster, ProgressReporter, SourceFile};
pub use error::{ProfexError, Result};
pub use extraction::{FieldExtractor, GeminiExtractor, DEFAULT_MODEL};
pub use record::{BatchStats, ProfileFields, ProfileRecord, RecordStatus};
pub use secrets::{resolve_secret, SecretError, API_KEY_ENV_VAR};
pub use spreadsheet::{default_export_filename, read_to_text, write_records, SpreadsheetError};
