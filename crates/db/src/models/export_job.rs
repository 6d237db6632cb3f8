//! Export job entity model and DTOs.

use askbox_core::export::ExportRecord;
use askbox_core::types::{DbId, JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::{ExportJobStatus, StatusId};

/// A row from the `export_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExportJob {
    pub id: JobId,
    /// The exported user. Stable across renames.
    pub user_id: DbId,
    /// The exported user's name when the job was submitted.
    pub username: String,
    pub requested_by: DbId,
    pub status_id: StatusId,
    pub result: Option<serde_json::Value>,
    pub artifact_path: Option<String>,
    pub error_message: Option<String>,
    pub submitted_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl ExportJob {
    /// Decoded status. Unknown ids are treated as `Failed`.
    pub fn status(&self) -> ExportJobStatus {
        ExportJobStatus::from_id(self.status_id).unwrap_or(ExportJobStatus::Failed)
    }

    /// Decode the stored result sequence, if the job has produced one.
    pub fn records(&self) -> Result<Option<Vec<ExportRecord>>, serde_json::Error> {
        self.result
            .as_ref()
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
    }
}

/// DTO for enqueueing an export.
#[derive(Debug, Clone)]
pub struct SubmitExportJob {
    pub user_id: DbId,
    pub username: String,
    pub requested_by: DbId,
}
