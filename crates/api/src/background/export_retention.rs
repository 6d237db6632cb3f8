//! Periodic cleanup of finished export jobs.
//!
//! Deletes `Ready` and `Failed` jobs that completed more than
//! `retention_hours` ago, together with their artifact files.

use std::sync::Arc;
use std::time::Duration;

use askbox_db::{JobQueue, StoreResult};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Purge jobs that finished before `now - retention_hours`. Returns the
/// number of jobs removed.
pub async fn purge_expired(queue: &dyn JobQueue, retention_hours: i64) -> StoreResult<usize> {
    let cutoff = Utc::now() - chrono::Duration::hours(retention_hours);
    let purged = queue.purge_finished_before(cutoff).await?;

    for job in &purged {
        let Some(path) = job.artifact_path.as_deref() else {
            continue;
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    job_id = %job.id,
                    path,
                    error = %e,
                    "Failed to delete export artifact",
                );
            }
        }
    }

    Ok(purged.len())
}

/// Run the export retention loop until `cancel` is triggered.
pub async fn run(queue: Arc<dyn JobQueue>, retention_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_hours,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Export retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Export retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match purge_expired(queue.as_ref(), retention_hours).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Export retention: purged finished jobs");
                    }
                    Ok(_) => {
                        tracing::debug!("Export retention: nothing to purge");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Export retention: cleanup failed");
                    }
                }
            }
        }
    }
}
