//! Export job polling loop.
//!
//! Claims jobs from the [`JobQueue`] (`SELECT FOR UPDATE SKIP LOCKED` on
//! PostgreSQL), runs them under a timeout and records `Ready` or `Failed`.
//! Several workers may poll the same queue; each job runs once. Jobs left
//! `Running` by a worker that died are failed once they outlive the job
//! timeout plus [`ExportConfig::abandon_grace`].

use std::sync::Arc;

use askbox_db::models::export_job::ExportJob;
use askbox_db::{ContentStore, JobQueue, StoreResult};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::ExportConfig;
use crate::export::{discard, run_export, temp_artifact_path, ExportError, ExportOutput};

/// Error recorded on jobs whose worker stopped before finishing them.
pub const ABANDONED_MESSAGE: &str = "Export abandoned: the worker stopped before finishing";

/// Long-lived export worker.
pub struct ExportWorker {
    store: Arc<dyn ContentStore>,
    queue: Arc<dyn JobQueue>,
    config: ExportConfig,
}

impl ExportWorker {
    pub fn new(
        store: Arc<dyn ContentStore>,
        queue: Arc<dyn JobQueue>,
        config: ExportConfig,
    ) -> Self {
        Self {
            store,
            queue,
            config,
        }
    }

    /// Run the worker loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            job_timeout_secs = self.config.job_timeout.as_secs(),
            export_dir = %self.config.export_dir.display(),
            "Export worker started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Export worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.reap_abandoned().await {
                        tracing::error!(error = %e, "Reaping abandoned export jobs failed");
                    }
                    // Drain everything that is pending before sleeping again.
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        match self.run_once().await {
                            Ok(true) => continue,
                            Ok(false) => break,
                            Err(e) => {
                                tracing::error!(error = %e, "Export poll cycle failed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Claim and process at most one job. Returns whether a job was claimed.
    pub async fn run_once(&self) -> StoreResult<bool> {
        let Some(job) = self.queue.claim_next().await? else {
            return Ok(false);
        };
        tracing::info!(job_id = %job.id, user_id = job.user_id, "Export job claimed");

        match self.execute(&job).await {
            Ok(output) => self.record_success(&job, output).await?,
            Err(e) => self.record_failure(&job, &e).await?,
        }
        Ok(true)
    }

    /// Fail jobs that have been `Running` longer than any live worker would
    /// let them run, and remove their staged files. Returns how many were failed.
    pub async fn reap_abandoned(&self) -> StoreResult<usize> {
        let max_age = self.config.job_timeout + self.config.abandon_grace;
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return Ok(0);
        };
        let reaped = self
            .queue
            .fail_abandoned(Utc::now() - max_age, ABANDONED_MESSAGE)
            .await?;
        for job in &reaped {
            tracing::warn!(job_id = %job.id, user_id = job.user_id, "Abandoned export job failed");
            discard(&temp_artifact_path(&self.config.export_dir, job)).await;
        }
        Ok(reaped.len())
    }

    async fn execute(&self, job: &ExportJob) -> Result<ExportOutput, ExportError> {
        let timeout = self.config.job_timeout;
        let run = run_export(self.store.as_ref(), job, &self.config.export_dir);
        match tokio::time::timeout(timeout, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                discard(&temp_artifact_path(&self.config.export_dir, job)).await;
                Err(ExportError::Timeout(timeout))
            }
        }
    }

    async fn record_success(&self, job: &ExportJob, output: ExportOutput) -> StoreResult<()> {
        let result = match serde_json::to_value(&output.records) {
            Ok(value) => value,
            Err(e) => {
                discard(&output.artifact_path).await;
                return self.record_failure(job, &ExportError::from(e)).await;
            }
        };
        let artifact_path = output.artifact_path.to_string_lossy();

        match self.queue.complete(job.id, &result, &artifact_path).await {
            Ok(true) => {
                tracing::info!(
                    job_id = %job.id,
                    records = output.records.len(),
                    artifact = %artifact_path,
                    "Export job ready",
                );
                Ok(())
            }
            Ok(false) => {
                tracing::warn!(job_id = %job.id, "Export finished after the job was failed");
                discard(&output.artifact_path).await;
                Ok(())
            }
            Err(e) => {
                discard(&output.artifact_path).await;
                self.record_failure(job, &ExportError::Store(e)).await
            }
        }
    }

    async fn record_failure(&self, job: &ExportJob, error: &ExportError) -> StoreResult<()> {
        tracing::warn!(
            job_id = %job.id,
            user_id = job.user_id,
            error = %error,
            "Export job failed",
        );
        if !self.queue.fail(job.id, &error.to_string()).await? {
            tracing::debug!(job_id = %job.id, "Export job was already finished");
        }
        Ok(())
    }
}
