pub mod account;
pub mod auth;
pub mod health;
pub mod questions;
pub mod search;
pub mod tasks;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree. All routes live at the root.
///
/// ```text
/// /health                          service + store health
///
/// /register                        create account (public)
/// /login                           email + password -> token (public)
/// /account                         get, update (requires auth)
///
/// /, /home, /question              recent questions (?page=)
/// /question/new                    create (requires auth)
/// /question/{id}                   question + answers
/// /question/{id}/update            edit (author only)
/// /question/{id}/delete            delete (author only)
/// /question/{id}/answer            answer (requires auth)
///
/// /user/{username}                 user's questions (?page=)
/// /user/download/{username}        enqueue export (requires auth)
///
/// /task/{job_id}                   export status
/// /task/{job_id}/result            export records once Ready
///
/// /search                          title search (form field `keyword`)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(account::router())
        .merge(questions::router())
        .merge(users::router())
        .merge(tasks::router())
        .merge(search::router())
}
