//! A single export run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use askbox_core::export::{artifact_file_name, ExportRecord};
use askbox_core::types::DbId;
use askbox_db::models::export_job::ExportJob;
use askbox_db::{ContentStore, StoreError};

/// Errors that fail an export job.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("User not found: id {0}")]
    UserNotFound(DbId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Artifact write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export timed out after {0:?}")]
    Timeout(Duration),
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// Questions newest first, exactly as written to the artifact.
    pub records: Vec<ExportRecord>,
    pub artifact_path: PathBuf,
}

/// Where the finished artifact for `job` is written.
pub fn artifact_path(export_dir: &Path, job: &ExportJob) -> PathBuf {
    export_dir.join(artifact_file_name(&job.username, job.id))
}

/// Hidden sibling of [`artifact_path`] the payload is staged in.
pub fn temp_artifact_path(export_dir: &Path, job: &ExportJob) -> PathBuf {
    export_dir.join(format!(".{}.tmp", artifact_file_name(&job.username, job.id)))
}

/// Export every question the job's user has posted into `export_dir`.
///
/// The user is looked up by id, so a rename after submission does not fail
/// the job. The artifact is written to a hidden temporary file in the same
/// directory and renamed into place, so readers never observe a partial file.
pub async fn run_export(
    store: &dyn ContentStore,
    job: &ExportJob,
    export_dir: &Path,
) -> Result<ExportOutput, ExportError> {
    let user = store
        .find_user_by_id(job.user_id)
        .await?
        .ok_or(ExportError::UserNotFound(job.user_id))?;

    let records: Vec<ExportRecord> = store
        .all_questions_by_author(user.id)
        .await?
        .iter()
        .map(|q| ExportRecord::new(&user.username, &q.title, &q.content, q.created_at))
        .collect();

    let payload = serde_json::to_vec_pretty(&records)?;

    tokio::fs::create_dir_all(export_dir).await?;
    let artifact_path = artifact_path(export_dir, job);
    let tmp_path = temp_artifact_path(export_dir, job);

    let written = match tokio::fs::write(&tmp_path, &payload).await {
        Ok(()) => tokio::fs::rename(&tmp_path, &artifact_path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        discard(&tmp_path).await;
        return Err(e.into());
    }

    tracing::debug!(
        job_id = %job.id,
        user_id = user.id,
        records = records.len(),
        path = %artifact_path.display(),
        "Export artifact written",
    );

    Ok(ExportOutput {
        records,
        artifact_path,
    })
}

/// Best-effort removal of a staged or orphaned artifact.
pub(crate) async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove export file");
        }
    }
}
