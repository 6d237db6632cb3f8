//! Handler for title search.

use askbox_core::error::CoreError;
use askbox_search::SearchHit;
use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Form body for `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub keyword: String,
}

/// Search results. `degraded` is set when the engine could not be queried.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub keyword: String,
    pub hits: Vec<SearchHit>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// POST /search
///
/// Refresh the index, then search titles for `keyword`. When the search
/// engine is unreachable the response is still 200, with `degraded: true`
/// and an explanatory message.
pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> AppResult<Json<DataResponse<SearchResults>>> {
    let keyword = form.keyword.trim().to_string();
    if keyword.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Search keyword is required".into(),
        )));
    }

    let outcome = match state.search.refresh().await {
        Ok(()) => state.search.search(&keyword).await,
        Err(e) => Err(e),
    };

    let results = match outcome {
        Ok(hits) => SearchResults {
            keyword,
            hits,
            degraded: false,
            message: None,
        },
        Err(e) => {
            tracing::warn!(
                keyword = %keyword,
                error = %e,
                "Search unavailable, returning degraded result",
            );
            SearchResults {
                keyword,
                hits: Vec::new(),
                degraded: true,
                message: Some("Search is temporarily unavailable. Please try again later.".into()),
            }
        }
    };

    Ok(Json(DataResponse { data: results }))
}
