//! Handlers for questions and their answers.
//!
//! Store writes come first. The search index is then synced best-effort: a
//! failed index write is logged and left for the reconciliation pass, and the
//! request still succeeds.

use askbox_core::error::CoreError;
use askbox_core::pagination::Page;
use askbox_core::types::DbId;
use askbox_core::validation::{validate_answer, validate_question};
use askbox_db::models::answer::{Answer, CreateAnswer};
use askbox_db::models::question::{CreateQuestion, Question, UpdateQuestion};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// Request body for `POST /question/new` and `POST /question/{id}/update`.
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Request body for `POST /question/{id}/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub body: String,
}

/// A question with its answers, oldest answer first.
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    pub question: Question,
    pub answers: Vec<Answer>,
}

async fn find_question(state: &AppState, id: DbId) -> AppResult<Question> {
    state
        .store
        .get_question(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Question", id)))
}

/// Fetch a question and verify the caller wrote it. `action` is used in the
/// error message (e.g. "update", "delete").
async fn find_and_authorize(
    state: &AppState,
    id: DbId,
    auth: &AuthUser,
    action: &str,
) -> AppResult<Question> {
    let question = find_question(state, id).await?;
    if question.author_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} another user's question"
        ))));
    }
    Ok(question)
}

async fn index_title(state: &AppState, id: DbId, title: &str) {
    if let Err(e) = state.search.index(id, title).await {
        tracing::warn!(question_id = id, error = %e, "Search index write failed");
    }
}

async fn unindex(state: &AppState, id: DbId) {
    if let Err(e) = state.search.remove(id).await {
        tracing::warn!(question_id = id, error = %e, "Search index delete failed");
    }
}

/// GET / (also `/home`, `/question`)
///
/// Most recent questions, 10 per page.
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<Question>>>> {
    let page = state.store.list_recent_questions(params.questions()).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /question/{id}
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QuestionDetail>>> {
    let question = find_question(&state, id).await?;
    let answers = state.store.list_answers_by_question(id).await?;
    Ok(Json(DataResponse {
        data: QuestionDetail { question, answers },
    }))
}

/// POST /question/new
///
/// Create a question and push its title to the search index. Returns 201.
pub async fn create_question(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<QuestionRequest>,
) -> AppResult<impl IntoResponse> {
    let title = input.title.trim();
    validate_question(title)?;

    let question = state
        .store
        .create_question(&CreateQuestion {
            title: title.to_string(),
            content: input.content,
            author_id: auth.user_id,
        })
        .await?;

    index_title(&state, question.id, &question.title).await;

    tracing::info!(
        question_id = question.id,
        user_id = auth.user_id,
        username = %auth.username,
        "Question posted",
    );

    Ok(created(question))
}

/// POST /question/{id}/update
///
/// Author only. Replaces title and description and re-indexes the title.
pub async fn update_question(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<QuestionRequest>,
) -> AppResult<Json<DataResponse<Question>>> {
    find_and_authorize(&state, id, &auth, "update").await?;

    let title = input.title.trim();
    validate_question(title)?;

    let question = state
        .store
        .update_question(
            id,
            &UpdateQuestion {
                title: title.to_string(),
                content: input.content,
            },
        )
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Question", id)))?;

    index_title(&state, question.id, &question.title).await;

    tracing::info!(question_id = id, user_id = auth.user_id, "Question updated");

    Ok(Json(DataResponse { data: question }))
}

/// POST /question/{id}/delete
///
/// Author only. Deletes the question and its answers and drops it from the
/// index. Returns 204.
pub async fn delete_question(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_and_authorize(&state, id, &auth, "delete").await?;

    if !state.store.delete_question(id).await? {
        return Err(AppError::Core(CoreError::not_found("Question", id)));
    }
    unindex(&state, id).await;

    tracing::info!(question_id = id, user_id = auth.user_id, "Question deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /question/{id}/answer
///
/// Any logged-in user may answer. Returns 201.
pub async fn create_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AnswerRequest>,
) -> AppResult<impl IntoResponse> {
    validate_answer(&input.body)?;
    find_question(&state, id).await?;

    let answer = state
        .store
        .create_answer(&CreateAnswer {
            body: input.body.trim().to_string(),
            author_id: auth.user_id,
            question_id: id,
        })
        .await?;

    tracing::info!(
        answer_id = answer.id,
        question_id = id,
        user_id = auth.user_id,
        username = %auth.username,
        "Answer posted",
    );

    Ok(created(answer))
}
