//! Full-text index of question titles.
//!
//! The index is a projection of the content store keyed by question id.
//! Writes are best-effort and only become visible to [`SearchIndex::search`]
//! after [`SearchIndex::refresh`].

pub mod elasticsearch;
pub mod memory;
pub mod query;

use askbox_core::types::DbId;
use async_trait::async_trait;
use serde::Serialize;

pub use elasticsearch::{ElasticsearchConfig, ElasticsearchIndex};
pub use memory::MemoryIndex;

/// Default index name.
pub const DEFAULT_INDEX: &str = "input_data";

/// A ranked match returned by [`SearchIndex::search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: DbId,
    pub title: String,
    pub score: f64,
}

/// Errors from the search backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The engine could not be reached or did not answer in time.
    #[error("Search engine unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    /// The engine answered with a non-2xx status.
    #[error("Search engine error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The engine answered with a body we could not interpret.
    #[error("Unexpected search response: {0}")]
    Decode(String),
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Operations on the question-title index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Upsert the document for `question_id`. Idempotent.
    async fn index(&self, question_id: DbId, title: &str) -> SearchResult<()>;

    /// Delete the document for `question_id`. Missing documents are not an error.
    async fn remove(&self, question_id: DbId) -> SearchResult<()>;

    /// Make all prior writes visible to [`SearchIndex::search`].
    async fn refresh(&self) -> SearchResult<()>;

    /// Ranked matches for `keyword`, best first.
    async fn search(&self, keyword: &str) -> SearchResult<Vec<SearchHit>>;

    /// Ids of every visible document. Used by reconciliation to find stale entries.
    async fn indexed_ids(&self) -> SearchResult<Vec<DbId>>;
}
