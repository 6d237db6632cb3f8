//! Handlers for the caller's own account.

use askbox_core::error::CoreError;
use askbox_core::types::DbId;
use askbox_core::validation::validate_account_update;
use askbox_db::models::user::{UpdateUser, User, UserResponse};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /account`. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Reject `username` if another user already has it. `owner` is skipped.
pub(crate) async fn ensure_username_free(
    state: &AppState,
    username: &str,
    owner: Option<DbId>,
) -> AppResult<()> {
    match state.store.find_user_by_username(username).await? {
        Some(existing) if Some(existing.id) != owner => Err(AppError::Core(
            CoreError::Validation("That username is taken. Please choose a different one".into()),
        )),
        _ => Ok(()),
    }
}

/// Reject `email` if another user already has it. `owner` is skipped.
pub(crate) async fn ensure_email_free(
    state: &AppState,
    email: &str,
    owner: Option<DbId>,
) -> AppResult<()> {
    match state.store.find_user_by_email(email).await? {
        Some(existing) if Some(existing.id) != owner => Err(AppError::Core(
            CoreError::Validation("That email is taken. Please choose a different one".into()),
        )),
        _ => Ok(()),
    }
}

async fn load_self(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))
}

/// GET /account
pub async fn get_account(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_self(&state, &auth).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /account
///
/// Change username and/or email. Keeping the current value is always allowed.
pub async fn update_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateAccountRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let username = input.username.as_deref().map(str::trim);
    let email = input.email.as_deref().map(str::trim);
    validate_account_update(username, email)?;

    if let Some(username) = username {
        ensure_username_free(&state, username, Some(auth.user_id)).await?;
    }
    if let Some(email) = email {
        ensure_email_free(&state, email, Some(auth.user_id)).await?;
    }

    let user = state
        .store
        .update_user(
            auth.user_id,
            &UpdateUser {
                username: username.map(str::to_string),
                email: email.map(str::to_string),
            },
        )
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;

    tracing::info!(user_id = user.id, "Account updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
