//! Handlers for polling export jobs.

use askbox_core::error::CoreError;
use askbox_core::export::ExportRecord;
use askbox_core::types::JobId;
use askbox_db::models::export_job::ExportJob;
use askbox_db::models::status::ExportJobStatus;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_job(state: &AppState, job_id: JobId) -> AppResult<ExportJob> {
    state
        .jobs
        .find(job_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Task", job_id)))
}

/// GET /task/{job_id}
///
/// `{"data": "Pending" | "Running" | "Ready" | "Failed"}`.
pub async fn task_status(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<Json<DataResponse<&'static str>>> {
    let job = find_job(&state, job_id).await?;
    Ok(Json(DataResponse {
        data: job.status().label(),
    }))
}

/// GET /task/{job_id}/result
///
/// The exported records once the job is `Ready`. Earlier, or after a failure,
/// returns 409.
pub async fn task_result(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<Json<DataResponse<Vec<ExportRecord>>>> {
    let job = find_job(&state, job_id).await?;

    match job.status() {
        ExportJobStatus::Ready => {
            let records = job
                .records()
                .map_err(|e| AppError::Internal(format!("Corrupt export result: {e}")))?
                .unwrap_or_default();
            Ok(Json(DataResponse { data: records }))
        }
        ExportJobStatus::Failed => Err(AppError::Core(CoreError::Conflict(format!(
            "Export failed: {}",
            job.error_message.as_deref().unwrap_or("unknown error")
        )))),
        status => Err(AppError::Core(CoreError::Conflict(format!(
            "Export is not ready yet (status: {})",
            status.label()
        )))),
    }
}
