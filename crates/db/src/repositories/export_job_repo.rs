//! Repository for the `export_jobs` table.
//!
//! Uses `ExportJobStatus` from `models::status` for all status transitions.

use askbox_core::types::{JobId, Timestamp};
use sqlx::PgPool;

use crate::models::export_job::{ExportJob, SubmitExportJob};
use crate::models::status::ExportJobStatus;

/// Column list for `export_jobs` queries.
const COLUMNS: &str = "\
    id, user_id, username, requested_by, status_id, result, artifact_path, error_message, \
    submitted_at, claimed_at, started_at, completed_at";

/// Provides queue operations for export jobs.
pub struct ExportJobRepo;

impl ExportJobRepo {
    /// Create a new pending job. Returns immediately with the job row.
    pub async fn submit(pool: &PgPool, input: &SubmitExportJob) -> Result<ExportJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO export_jobs (id, user_id, username, requested_by, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExportJob>(&query)
            .bind(uuid::Uuid::new_v4())
            .bind(input.user_id)
            .bind(&input.username)
            .bind(input.requested_by)
            .bind(ExportJobStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: JobId) -> Result<Option<ExportJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM export_jobs WHERE id = $1");
        sqlx::query_as::<_, ExportJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest pending job and mark it running.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent workers never
    /// claim the same job.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<ExportJob>, sqlx::Error> {
        let query = format!(
            "UPDATE export_jobs \
             SET status_id = $1, claimed_at = NOW(), started_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM export_jobs \
                 WHERE status_id = $2 \
                 ORDER BY submitted_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExportJob>(&query)
            .bind(ExportJobStatus::Running.id())
            .bind(ExportJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a running job ready with its result sequence and artifact location.
    ///
    /// Returns `false` if the job was no longer running (already reaped).
    pub async fn complete(
        pool: &PgPool,
        id: JobId,
        result: &serde_json::Value,
        artifact_path: &str,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE export_jobs \
             SET status_id = $2, result = $3, artifact_path = $4, completed_at = NOW() \
             WHERE id = $1 AND status_id = $5",
        )
        .bind(id)
        .bind(ExportJobStatus::Ready.id())
        .bind(result)
        .bind(artifact_path)
        .bind(ExportJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() == 1)
    }

    /// Mark a running job as failed with an error message. No automatic retry.
    ///
    /// Returns `false` if the job was no longer running.
    pub async fn fail(pool: &PgPool, id: JobId, error: &str) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE export_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(ExportJobStatus::Failed.id())
        .bind(error)
        .bind(ExportJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() == 1)
    }

    /// Fail every job still running that started before `cutoff`, returning them.
    pub async fn fail_running_started_before(
        pool: &PgPool,
        cutoff: Timestamp,
        error: &str,
    ) -> Result<Vec<ExportJob>, sqlx::Error> {
        let query = format!(
            "UPDATE export_jobs \
             SET status_id = $1, error_message = $2, completed_at = NOW() \
             WHERE status_id = $3 AND started_at < $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExportJob>(&query)
            .bind(ExportJobStatus::Failed.id())
            .bind(error)
            .bind(ExportJobStatus::Running.id())
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Delete finished jobs completed before `cutoff`, returning the removed rows.
    pub async fn delete_finished_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<ExportJob>, sqlx::Error> {
        let query = format!(
            "DELETE FROM export_jobs \
             WHERE completed_at IS NOT NULL AND completed_at < $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExportJob>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }
}
