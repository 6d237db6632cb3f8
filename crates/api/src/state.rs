use std::sync::Arc;

use askbox_db::{ContentStore, JobQueue};
use askbox_search::SearchIndex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Users, questions and answers.
    pub store: Arc<dyn ContentStore>,
    /// Question-title index.
    pub search: Arc<dyn SearchIndex>,
    /// Export job queue and result backend.
    pub jobs: Arc<dyn JobQueue>,
    pub config: Arc<ServerConfig>,
}
