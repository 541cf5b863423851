//! Shared helpers for profex integration tests.
//!
//! Provides an on-disk fixture directory for workbook files, a scripted
//! extractor so batches run without network access, and a reporter that
//! records every progress event for later assertions.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use profex::batch::BatchProgressEvent;
use profex::extraction::error::Result as ExtractionResult;
use profex::extraction::{ExtractionError, FieldExtractor};
use profex::record::ProfileFields;
use profex::spreadsheet::write_sheet;
use profex::ProgressReporter;

/// Temp directory holding workbook fixtures for one test.
pub struct FixtureDir {
    temp_dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Writes a single-sheet workbook built from the given rows.
    pub fn write_workbook(&self, filename: &str, rows: &[Vec<String>]) -> PathBuf {
        let bytes = write_sheet("Sheet1", rows).expect("Failed to build workbook");
        self.write_raw(filename, &bytes)
    }

    /// Writes arbitrary bytes, for corrupt-file cases.
    pub fn write_raw(&self, filename: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(filename);
        std::fs::write(&path, bytes).expect("Failed to write fixture file");
        path
    }

    /// Path inside the fixture directory without creating the file.
    pub fn path(&self, filename: &str) -> PathBuf {
        self.temp_dir.path().join(filename)
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome the stub extractor returns for a matched file.
#[derive(Clone)]
pub enum StubOutcome {
    Fields(ProfileFields),
    QuotaExceeded,
}

/// Scripted extractor keyed on markers in the sheet text.
///
/// Each rule pairs a substring with an outcome; the first rule whose
/// marker appears in the text wins. Unmatched text gets empty fields,
/// so tests only script the files they care about.
pub struct StubExtractor {
    rules: Vec<(String, StubOutcome)>,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn on(mut self, marker: &str, outcome: StubOutcome) -> Self {
        self.rules.push((marker.to_string(), outcome));
        self
    }
}

impl Default for StubExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FieldExtractor for StubExtractor {
    async fn extract(&self, csv_data: &str) -> ExtractionResult<ProfileFields> {
        for (marker, outcome) in &self.rules {
            if !csv_data.contains(marker.as_str()) {
                continue;
            }
            return match outcome {
                StubOutcome::Fields(fields) => Ok(fields.clone()),
                StubOutcome::QuotaExceeded => Err(ExtractionError::Api {
                    status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                    body: "You exceeded your current quota".to_string(),
                }),
            };
        }
        Ok(ProfileFields::default())
    }
}

/// Records every progress event it receives.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<BatchProgressEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BatchProgressEvent> {
        self.events.lock().expect("Event log poisoned").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, event: BatchProgressEvent) {
        self.events.lock().expect("Event log poisoned").push(event);
    }
}

/// Fields with just a name and school filled in.
pub fn fields_named(name: &str, school: &str) -> ProfileFields {
    ProfileFields {
        name: Some(name.to_string()),
        school: Some(school.to_string()),
        ..Default::default()
    }
}
