//! In-process [`SearchIndex`].
//!
//! Writes are staged and only applied on [`SearchIndex::refresh`], the same
//! visibility the search engine gives. Matching is a case-insensitive
//! substring test on the title; score favours titles where the keyword is a
//! larger share of the text.

use std::collections::BTreeMap;

use askbox_core::types::DbId;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::query::{normalize_keyword, MAX_HITS};
use crate::{SearchHit, SearchIndex, SearchResult};

#[derive(Debug, Clone)]
enum PendingWrite {
    Upsert(String),
    Delete,
}

#[derive(Debug, Default)]
struct IndexState {
    visible: BTreeMap<DbId, String>,
    pending: Vec<(DbId, PendingWrite)>,
}

/// [`SearchIndex`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    state: Mutex<IndexState>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn index(&self, question_id: DbId, title: &str) -> SearchResult<()> {
        self.state
            .lock()
            .await
            .pending
            .push((question_id, PendingWrite::Upsert(title.to_string())));
        Ok(())
    }

    async fn remove(&self, question_id: DbId) -> SearchResult<()> {
        self.state
            .lock()
            .await
            .pending
            .push((question_id, PendingWrite::Delete));
        Ok(())
    }

    async fn refresh(&self) -> SearchResult<()> {
        let mut state = self.state.lock().await;
        let pending = std::mem::take(&mut state.pending);
        for (id, write) in pending {
            match write {
                PendingWrite::Upsert(title) => {
                    state.visible.insert(id, title);
                }
                PendingWrite::Delete => {
                    state.visible.remove(&id);
                }
            }
        }
        Ok(())
    }

    async fn search(&self, keyword: &str) -> SearchResult<Vec<SearchHit>> {
        let Some(keyword) = normalize_keyword(keyword) else {
            return Ok(Vec::new());
        };
        let needle = keyword.to_lowercase();
        let state = self.state.lock().await;

        let mut hits: Vec<SearchHit> = state
            .visible
            .iter()
            .filter(|(_, title)| title.to_lowercase().contains(&needle))
            .map(|(id, title)| SearchHit {
                id: *id,
                title: title.clone(),
                score: needle.chars().count() as f64 / title.chars().count().max(1) as f64,
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(b.id.cmp(&a.id)));
        hits.truncate(MAX_HITS);
        Ok(hits)
    }

    async fn indexed_ids(&self) -> SearchResult<Vec<DbId>> {
        Ok(self.state.lock().await.visible.keys().copied().collect())
    }
}
