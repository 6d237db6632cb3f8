//! Route definitions for questions and answers.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::questions;
use crate::state::AppState;

/// ```text
/// GET  /                       -> home
/// GET  /home                   -> home
/// GET  /question               -> home
/// POST /question/new           -> create_question
/// GET  /question/{id}          -> get_question
/// POST /question/{id}/update   -> update_question
/// POST /question/{id}/delete   -> delete_question
/// POST /question/{id}/answer   -> create_answer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(questions::home))
        .route("/home", get(questions::home))
        .route("/question", get(questions::home))
        .route("/question/new", post(questions::create_question))
        .route("/question/{id}", get(questions::get_question))
        .route("/question/{id}/update", post(questions::update_question))
        .route("/question/{id}/delete", post(questions::delete_question))
        .route("/question/{id}/answer", post(questions::create_answer))
}
