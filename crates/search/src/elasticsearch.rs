//! [`SearchIndex`] over the Elasticsearch REST API.
//!
//! Wire calls: `HEAD /{index}`, `PUT /{index}`, `PUT /{index}/_doc/{id}`,
//! `DELETE /{index}/_doc/{id}`, `POST /{index}/_refresh` and
//! `POST /{index}/_search`. The index is created on first use.

use std::time::Duration;

use askbox_core::types::DbId;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::query::{build_title_query, id_page_query, index_mapping, normalize_keyword};
use crate::{SearchError, SearchHit, SearchIndex, SearchResult, DEFAULT_INDEX};

/// Ids fetched per `_search` call by [`SearchIndex::indexed_ids`].
const ID_PAGE_SIZE: usize = 1_000;

/// Error type Elasticsearch reports when `PUT /{index}` loses a creation race.
const INDEX_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// Connection settings for the search engine.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL, e.g. `http://localhost:9200`.
    pub url: String,
    pub index: String,
    pub timeout: Duration,
}

impl ElasticsearchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: DEFAULT_INDEX.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// HTTP client for one Elasticsearch index.
pub struct ElasticsearchIndex {
    client: reqwest::Client,
    base_url: String,
    index: String,
    ensured: OnceCell<()>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: Option<TitleSource>,
}

#[derive(Debug, Deserialize)]
struct TitleSource {
    title: String,
}

impl ElasticsearchIndex {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: ElasticsearchConfig) -> SearchResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index,
            ensured: OnceCell::new(),
        })
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index)
    }

    fn doc_url(&self, id: DbId) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }

    /// Create the index if it does not exist yet. Runs once per client.
    async fn ensure_index(&self) -> SearchResult<()> {
        self.ensured
            .get_or_try_init(|| self.create_index_if_missing())
            .await
            .map(|_| ())
    }

    async fn create_index_if_missing(&self) -> SearchResult<()> {
        let head = self.client.head(self.index_url()).send().await?;
        if head.status() != StatusCode::NOT_FOUND {
            Self::ensure_success(head).await?;
            return Ok(());
        }

        let created = self
            .client
            .put(self.index_url())
            .json(&index_mapping())
            .send()
            .await?;
        let status = created.status();
        if status.is_success() {
            tracing::info!(index = %self.index, "Created search index");
            return Ok(());
        }

        let body = created.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && body.contains(INDEX_EXISTS_ERROR) {
            tracing::debug!(index = %self.index, "Search index created by another process");
            return Ok(());
        }
        Err(SearchError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn run_search(&self, body: &serde_json::Value) -> SearchResult<Vec<RawHit>> {
        self.ensure_index().await?;
        let response = self
            .client
            .post(format!("{}/_search", self.index_url()))
            .json(body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(parsed.hits.hits)
    }

    async fn ensure_success(response: reqwest::Response) -> SearchResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn parse_id(raw: &str) -> SearchResult<DbId> {
    raw.parse()
        .map_err(|_| SearchError::Decode(format!("non-numeric document id '{raw}'")))
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn index(&self, question_id: DbId, title: &str) -> SearchResult<()> {
        self.ensure_index().await?;
        let response = self
            .client
            .put(self.doc_url(question_id))
            .json(&serde_json::json!({ "id": question_id, "title": title }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn remove(&self, question_id: DbId) -> SearchResult<()> {
        self.ensure_index().await?;
        let response = self.client.delete(self.doc_url(question_id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn refresh(&self) -> SearchResult<()> {
        self.ensure_index().await?;
        let response = self
            .client
            .post(format!("{}/_refresh", self.index_url()))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn search(&self, keyword: &str) -> SearchResult<Vec<SearchHit>> {
        let Some(keyword) = normalize_keyword(keyword) else {
            return Ok(Vec::new());
        };
        self.run_search(&build_title_query(&keyword))
            .await?
            .into_iter()
            .map(|hit| {
                Ok(SearchHit {
                    id: parse_id(&hit.id)?,
                    title: hit.source.map(|s| s.title).unwrap_or_default(),
                    score: hit.score.unwrap_or(0.0),
                })
            })
            .collect()
    }

    async fn indexed_ids(&self) -> SearchResult<Vec<DbId>> {
        let mut ids = Vec::new();
        let mut after = None;
        loop {
            let page = self.run_search(&id_page_query(ID_PAGE_SIZE, after)).await?;
            for hit in &page {
                ids.push(parse_id(&hit.id)?);
            }
            if page.len() < ID_PAGE_SIZE {
                return Ok(ids);
            }
            after = ids.last().copied();
        }
    }
}
