use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// GET  /user/{username}            -> user_questions
/// POST /user/download/{username}   -> download
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{username}", get(users::user_questions))
        .route("/user/download/{username}", post(users::download))
}
