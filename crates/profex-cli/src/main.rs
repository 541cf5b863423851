//! Command-line front end for batch profile extraction.
//!
//! Reads handover workbooks, extracts profile fields through the Gemini
//! API one file at a time, and writes the consolidated export workbook.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use profex::batch::{
    BatchProgressEvent, BatchRunner, BatchState, ProgressReporter, SourceFile, PACING_DELAY,
};
use profex::extraction::{GeminiExtractor, DEFAULT_MODEL};
use profex::record::RecordStatus;
use profex::secrets::{resolve_secret, API_KEY_ENV_VAR};
use profex::spreadsheet::{default_export_filename, write_records, SpreadsheetFormat};

/// Extract student profiles from handover spreadsheets in one batch.
#[derive(Parser, Debug)]
#[command(name = "profex", version, about)]
struct Args {
    /// Handover form files to process (.xlsx or .xls)
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Where to write the consolidated workbook (default: 学员画像汇总_全字段_<date>.xlsx)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Gemini model to use
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Read the API key from this file instead of the GEMINI_API_KEY env var
    #[arg(long, value_name = "PATH")]
    api_key_file: Option<PathBuf>,

    /// Milliseconds to pause between files
    #[arg(long, default_value_t = PACING_DELAY.as_millis() as u64)]
    pacing_ms: u64,
}

/// Logs each record transition as the batch runs.
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: BatchProgressEvent) {
        let position = format!("[{}/{}]", event.index + 1, event.stats.total);
        match event.status {
            RecordStatus::Processing => {
                info!("{} Processing '{}'", position, event.file_name);
            }
            RecordStatus::Success => {
                info!(
                    "{} Finished '{}' ({}% complete)",
                    position,
                    event.file_name,
                    event.stats.percent_complete()
                );
            }
            RecordStatus::Error => {
                warn!(
                    "{} Failed '{}': {}",
                    position,
                    event.file_name,
                    event.error.as_deref().unwrap_or("unknown error")
                );
            }
            RecordStatus::Pending => {}
        }
    }
}

fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    // Route log-crate records from the library into tracing
    let _ = tracing_log::LogTracer::init();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    info!("Starting profex v{}", env!("CARGO_PKG_VERSION"));

    // Resolve the key up front so a missing credential fails fast
    // instead of partway through a batch.
    let api_key_file = args
        .api_key_file
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    let api_key = match resolve_secret(None, api_key_file.as_deref(), Some(API_KEY_ENV_VAR)) {
        Ok(key) => key,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let files: Vec<SourceFile> = args.files.into_iter().map(SourceFile::new).collect();
    for file in &files {
        let recognized = file
            .mime_type
            .as_deref()
            .and_then(SpreadsheetFormat::from_mime)
            .is_some();
        if !recognized {
            warn!(
                "'{}' does not look like an Excel workbook ({}), trying anyway",
                file.file_name,
                file.mime_type.as_deref().unwrap_or("unknown type")
            );
        }
    }

    let extractor = match GeminiExtractor::new(api_key) {
        Ok(extractor) => extractor.with_model(&args.model),
        Err(e) => {
            error!("Failed to create extraction client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = BatchState::from_files(files);
    let runner = BatchRunner::new(Arc::new(extractor))
        .with_pacing_delay(Duration::from_millis(args.pacing_ms));
    let state = runner.run(state, &ConsoleProgress).await;

    let bytes = match write_records(state.records()) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to build export workbook: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_export_filename(Utc::now().date_naive())));
    if let Err(e) = tokio::fs::write(&output_path, &bytes).await {
        error!("Failed to write '{}': {}", output_path.display(), e);
        return ExitCode::FAILURE;
    }

    let stats = state.stats();
    info!(
        "Exported {} record(s) to '{}' ({} succeeded, {} failed)",
        stats.total,
        output_path.display(),
        stats.success,
        stats.failed
    );
    ExitCode::SUCCESS
}
