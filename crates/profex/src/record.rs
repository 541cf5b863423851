use serde::{Deserialize, Serialize};

/// Structured fields extracted from one handover form.
///
/// Every field is optional text: `None` means "not found in the source
/// document", which is a meaningful value distinct from an empty string.
/// Serialized names follow the extraction schema (camelCase, with the
/// irregular `isKOL` key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_test_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cet_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_full_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(rename = "isKOL", skip_serializing_if = "Option::is_none")]
    pub is_kol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_personality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_time_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_manager: Option<String>,
}

impl ProfileFields {
    /// Returns true if no field was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Processing status of a record.
///
/// Lifecycle: `Pending` at creation, `Processing` once the orchestrator
/// picks the file up, then a terminal `Success` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Processing,
    Success,
    Error,
}

impl RecordStatus {
    /// Returns true for the terminal statuses.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Success | RecordStatus::Error)
    }

    /// Localized label used in the exported workbook. The export shows a
    /// binary outcome: anything other than `Success` reads 失败.
    pub fn export_label(&self) -> &'static str {
        match self {
            RecordStatus::Success => "成功",
            _ => "失败",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Pending => write!(f, "pending"),
            RecordStatus::Processing => write!(f, "processing"),
            RecordStatus::Success => write!(f, "success"),
            RecordStatus::Error => write!(f, "error"),
        }
    }
}

/// One uploaded file's extraction result plus its processing status.
///
/// A batch holds exactly one record per selected file, in selection order;
/// records are mutated in place as processing advances and never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Name of the source file. Set at creation, never changed.
    pub file_name: String,
    /// Extracted fields. All absent until the record succeeds.
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub status: RecordStatus,
    /// Human-readable failure message. Present exactly when status is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProfileRecord {
    /// Creates a fresh record for a newly selected file.
    pub fn pending(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            fields: ProfileFields::default(),
            status: RecordStatus::Pending,
            error_message: None,
        }
    }

    /// Marks the record as picked up by the orchestrator.
    pub fn begin_processing(&mut self) {
        self.status = RecordStatus::Processing;
    }

    /// Terminal success: stores the extracted fields.
    pub fn complete(&mut self, fields: ProfileFields) {
        self.fields = fields;
        self.status = RecordStatus::Success;
        self.error_message = None;
    }

    /// Terminal failure: stores the message and leaves all fields absent.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RecordStatus::Error;
        self.error_message = Some(message.into());
    }
}

/// Batch counters, derived from the record list on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    /// Records that reached a terminal status (success or error).
    pub processed: usize,
    pub success: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn from_records(records: &[ProfileRecord]) -> Self {
        let success = records
            .iter()
            .filter(|r| r.status == RecordStatus::Success)
            .count();
        let failed = records
            .iter()
            .filter(|r| r.status == RecordStatus::Error)
            .count();
        Self {
            total: records.len(),
            processed: success + failed,
            success,
            failed,
        }
    }

    /// Rounded completion percentage, 0 for an empty batch.
    pub fn percent_complete(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.processed as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}
