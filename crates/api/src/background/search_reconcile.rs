//! Periodic rebuild of the search index from the content store.
//!
//! Index writes on the request path are best-effort, so the index can miss
//! titles or keep deleted questions. Each pass re-indexes every question and
//! removes documents whose question no longer exists.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use askbox_core::types::DbId;
use askbox_db::{ContentStore, StoreError};
use askbox_search::{SearchError, SearchIndex};
use tokio_util::sync::CancellationToken;

/// Errors that abort a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Outcome of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub indexed: usize,
    pub removed: usize,
}

/// Bring the index in line with the store.
///
/// Request handlers keep writing to the store and the index while a pass
/// runs. A document is only removed once the store confirms its question is
/// gone at removal time, so questions created mid-pass stay indexed and
/// questions deleted mid-pass do not come back.
pub async fn reconcile_once(
    store: &dyn ContentStore,
    index: &dyn SearchIndex,
) -> Result<ReconcileReport, ReconcileError> {
    let questions = store.all_question_titles().await?;
    for question in &questions {
        index.index(question.id, &question.title).await?;
    }
    index.refresh().await?;

    let live: HashSet<DbId> = store
        .all_question_titles()
        .await?
        .into_iter()
        .map(|q| q.id)
        .collect();
    let candidates: Vec<DbId> = index
        .indexed_ids()
        .await?
        .into_iter()
        .filter(|id| !live.contains(id))
        .collect();

    let mut removed = 0;
    for id in candidates {
        if store.get_question(id).await?.is_some() {
            continue;
        }
        index.remove(id).await?;
        removed += 1;
    }
    if removed > 0 {
        index.refresh().await?;
    }

    Ok(ReconcileReport {
        indexed: questions.len(),
        removed,
    })
}

/// Run reconciliation every `interval` until `cancel` is triggered. The first
/// pass runs immediately, which backfills a fresh index at startup.
pub async fn run(
    store: Arc<dyn ContentStore>,
    index: Arc<dyn SearchIndex>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Search reconciliation started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Search reconciliation stopping");
                break;
            }
            _ = ticker.tick() => {
                match reconcile_once(store.as_ref(), index.as_ref()).await {
                    Ok(report) => {
                        tracing::info!(
                            indexed = report.indexed,
                            removed = report.removed,
                            "Search reconciliation: pass complete",
                        );
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Search reconciliation: pass failed");
                    }
                }
            }
        }
    }
}
