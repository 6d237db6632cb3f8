//! Handlers for registration and login.

use askbox_core::error::CoreError;
use askbox_core::validation::validate_registration;
use askbox_db::models::user::{CreateUser, UserResponse};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, password_matches};
use crate::error::{AppError, AppResult};
use crate::handlers::account::{ensure_email_free, ensure_username_free};
use crate::response::{created, DataResponse};
use crate::state::AppState;

/// Request body for `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// POST /register
///
/// Create an account. Returns 201 with the new user. Taken usernames or
/// emails are reported as validation errors.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let username = input.username.trim();
    let email = input.email.trim();
    validate_registration(username, email, &input.password, &input.confirm_password)?;

    ensure_username_free(&state, username, None).await?;
    ensure_email_free(&state, email, None).await?;

    let password_hash = hash_password(&input.password)?;

    let user = state
        .store
        .create_user(&CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(created(UserResponse::from(&user)))
}

/// POST /login
///
/// Authenticate with email + password. Returns an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = state
        .store
        .find_user_by_email(input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password_matches(&input.password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let access_token = generate_access_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::Internal(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(DataResponse {
        data: AuthResponse {
            access_token,
            token_type: "Bearer",
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            user: UserResponse::from(&user),
        },
    }))
}
