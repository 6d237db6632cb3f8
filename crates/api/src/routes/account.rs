use axum::routing::get;
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// ```text
/// GET /account  -> get_account
/// PUT /account  -> update_account
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/account",
        get(account::get_account).put(account::update_account),
    )
}
