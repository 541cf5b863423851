use std::path::{Path, PathBuf};

use crate::record::{BatchStats, ProfileFields, ProfileRecord};

/// One selected input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Display name carried into the record and the export.
    pub file_name: String,
    /// MIME type of the file (e.g. the spreadsheet vnd types).
    pub mime_type: Option<String>,
}

impl SourceFile {
    /// Creates a source file, deriving the display name and MIME type
    /// from the path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let mime_type = Self::detect_mime_type(&path);
        Self {
            path,
            file_name,
            mime_type,
        }
    }

    /// Detects MIME type from the file path using the mime_guess crate.
    /// Returns `None` for unknown extensions.
    fn detect_mime_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

/// Mutable state of one batch run.
///
/// Holds exactly one record per selected file, in selection order. Records
/// change only through the transition methods; counters are derived on
/// demand and never stored.
#[derive(Debug)]
pub struct BatchState {
    files: Vec<SourceFile>,
    records: Vec<ProfileRecord>,
}

impl BatchState {
    /// Builds a fresh batch with every record pending.
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        let records = files
            .iter()
            .map(|file| ProfileRecord::pending(file.file_name.clone()))
            .collect();
        Self { files, records }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn records(&self) -> &[ProfileRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Derives the current counters from the records.
    pub fn stats(&self) -> BatchStats {
        BatchStats::from_records(&self.records)
    }

    pub(crate) fn mark_processing(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.begin_processing();
        }
    }

    pub(crate) fn mark_success(&mut self, index: usize, fields: ProfileFields) {
        if let Some(record) = self.records.get_mut(index) {
            record.complete(fields);
        }
    }

    pub(crate) fn mark_error(&mut self, index: usize, message: impl Into<String>) {
        if let Some(record) = self.records.get_mut(index) {
            record.fail(message);
        }
    }
}
