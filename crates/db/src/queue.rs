//! The export job queue seam.
//!
//! Jobs live in the `export_jobs` table, which doubles as the result
//! backend: workers claim rows, the status endpoint reads them.

use askbox_core::types::{JobId, Timestamp};
use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::export_job::{ExportJob, SubmitExportJob};
use crate::repositories::ExportJobRepo;
use crate::DbPool;

/// Durable queue of export jobs with a built-in result backend.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a pending job and return it without waiting for execution.
    async fn submit(&self, input: &SubmitExportJob) -> StoreResult<ExportJob>;
    async fn find(&self, id: JobId) -> StoreResult<Option<ExportJob>>;
    /// Claim the oldest pending job and move it to `Running`.
    async fn claim_next(&self) -> StoreResult<Option<ExportJob>>;
    /// Move a running job to `Ready`. Returns `false` if it was no longer running.
    async fn complete(
        &self,
        id: JobId,
        result: &serde_json::Value,
        artifact_path: &str,
    ) -> StoreResult<bool>;
    /// Move a running job to `Failed`. Returns `false` if it was no longer running.
    async fn fail(&self, id: JobId, error: &str) -> StoreResult<bool>;
    /// Fail jobs left `Running` since before `cutoff` by a worker that went away.
    async fn fail_abandoned(&self, cutoff: Timestamp, error: &str) -> StoreResult<Vec<ExportJob>>;
    /// Remove jobs that finished before `cutoff`, returning them.
    async fn purge_finished_before(&self, cutoff: Timestamp) -> StoreResult<Vec<ExportJob>>;
}

/// [`JobQueue`] over PostgreSQL.
#[derive(Clone)]
pub struct PgJobQueue {
    pool: DbPool,
}

impl PgJobQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobQueue for PgJobQueue {
    async fn submit(&self, input: &SubmitExportJob) -> StoreResult<ExportJob> {
        Ok(ExportJobRepo::submit(&self.pool, input).await?)
    }

    async fn find(&self, id: JobId) -> StoreResult<Option<ExportJob>> {
        Ok(ExportJobRepo::find_by_id(&self.pool, id).await?)
    }

    async fn claim_next(&self) -> StoreResult<Option<ExportJob>> {
        Ok(ExportJobRepo::claim_next(&self.pool).await?)
    }

    async fn complete(
        &self,
        id: JobId,
        result: &serde_json::Value,
        artifact_path: &str,
    ) -> StoreResult<bool> {
        Ok(ExportJobRepo::complete(&self.pool, id, result, artifact_path).await?)
    }

    async fn fail(&self, id: JobId, error: &str) -> StoreResult<bool> {
        Ok(ExportJobRepo::fail(&self.pool, id, error).await?)
    }

    async fn fail_abandoned(&self, cutoff: Timestamp, error: &str) -> StoreResult<Vec<ExportJob>> {
        Ok(ExportJobRepo::fail_running_started_before(&self.pool, cutoff, error).await?)
    }

    async fn purge_finished_before(&self, cutoff: Timestamp) -> StoreResult<Vec<ExportJob>> {
        Ok(ExportJobRepo::delete_finished_before(&self.pool, cutoff).await?)
    }
}
