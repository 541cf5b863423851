//! Sequential batch orchestration.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};

use crate::extraction::FieldExtractor;
use crate::record::ProfileFields;
use crate::spreadsheet;

use super::progress::{BatchProgressEvent, ProgressReporter};
use super::state::{BatchState, SourceFile};

/// Delay between files. Keeps the call rate well inside API limits.
pub const PACING_DELAY: Duration = Duration::from_millis(500);

/// Drives a batch through extraction, one file at a time.
///
/// Files are processed strictly in selection order with a fixed pause
/// between them. A failure marks its own record and the batch moves on;
/// the runner itself never fails.
pub struct BatchRunner {
    extractor: Arc<dyn FieldExtractor>,
    pacing_delay: Duration,
}

impl BatchRunner {
    pub fn new(extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            extractor,
            pacing_delay: PACING_DELAY,
        }
    }

    /// Overrides the pause between files.
    pub fn with_pacing_delay(mut self, pacing_delay: Duration) -> Self {
        self.pacing_delay = pacing_delay;
        self
    }

    /// Runs the batch to completion and returns the final state.
    ///
    /// Every record transition is published to `progress` as it happens,
    /// so observers can render the batch live.
    pub async fn run(&self, mut state: BatchState, progress: &dyn ProgressReporter) -> BatchState {
        if state.is_empty() {
            info!("No files selected, nothing to process");
            return state;
        }

        let total = state.len();
        info!("Starting batch of {} file(s)", total);

        for index in 0..total {
            let file = state.files()[index].clone();

            state.mark_processing(index);
            progress.report(BatchProgressEvent::from_record(
                index,
                &state.records()[index],
                state.stats(),
            ));

            match self.process_file(&file).await {
                Ok(fields) => state.mark_success(index, fields),
                Err(message) => {
                    warn!("Extraction failed for '{}': {}", file.file_name, message);
                    state.mark_error(index, message);
                }
            }
            progress.report(BatchProgressEvent::from_record(
                index,
                &state.records()[index],
                state.stats(),
            ));

            // Pause before the next file to stay clear of rate limits
            if index + 1 < total {
                tokio::time::sleep(self.pacing_delay).await;
            }
        }

        let stats = state.stats();
        info!(
            "Batch finished: {} succeeded, {} failed out of {}",
            stats.success, stats.failed, stats.total
        );
        state
    }

    /// Reads one file and extracts its fields. Any failure collapses to a
    /// record-level message.
    async fn process_file(&self, file: &SourceFile) -> Result<ProfileFields, String> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| format!("Failed to read '{}': {}", file.path.display(), e))?;

        let text = {
            let _span = info_span!("read_workbook", file = %file.file_name).entered();
            spreadsheet::read_to_text(&bytes).map_err(|e| e.to_string())?
        };

        self.extractor
            .extract(&text)
            .instrument(info_span!("extract_fields", file = %file.file_name))
            .await
            .map_err(|e| e.to_string())
    }
}
