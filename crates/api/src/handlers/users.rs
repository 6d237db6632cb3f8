//! Handlers for public user pages and user data export.

use askbox_core::error::CoreError;
use askbox_core::pagination::Page;
use askbox_core::types::JobId;
use askbox_db::models::export_job::SubmitExportJob;
use askbox_db::models::question::Question;
use askbox_db::models::user::{PublicUser, User};
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A user's public profile and one page of their questions.
#[derive(Debug, Serialize)]
pub struct UserQuestions {
    pub user: PublicUser,
    pub questions: Page<Question>,
}

/// Polling handle returned when an export is enqueued.
#[derive(Debug, Serialize)]
pub struct ExportAccepted {
    pub job_id: JobId,
    pub status: &'static str,
    pub status_url: String,
    pub result_url: String,
}

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    state
        .store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", username)))
}

/// GET /user/{username}
///
/// The user's questions, newest first, 10 per page.
pub async fn user_questions(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<UserQuestions>>> {
    let user = find_user(&state, &username).await?;
    let questions = state
        .store
        .list_questions_by_author(user.id, params.questions())
        .await?;
    Ok(Json(DataResponse {
        data: UserQuestions {
            user: PublicUser::from(&user),
            questions,
        },
    }))
}

/// POST /user/download/{username}
///
/// Enqueue an export of the user's questions and return immediately with 202
/// and `Location: /task/{job_id}`. Unknown usernames fail here with 404.
pub async fn download(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = find_user(&state, &username).await?;

    let job = state
        .jobs
        .submit(&SubmitExportJob {
            user_id: user.id,
            username: user.username,
            requested_by: auth.user_id,
        })
        .await?;

    tracing::info!(
        job_id = %job.id,
        username = %job.username,
        requested_by = auth.user_id,
        "Export job submitted",
    );

    let status_url = format!("/task/{}", job.id);
    Ok((
        StatusCode::ACCEPTED,
        [(LOCATION, status_url.clone())],
        Json(DataResponse {
            data: ExportAccepted {
                job_id: job.id,
                status: job.status().label(),
                result_url: format!("{status_url}/result"),
                status_url,
            },
        }),
    ))
}
