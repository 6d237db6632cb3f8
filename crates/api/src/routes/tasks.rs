use axum::routing::get;
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// ```text
/// GET /task/{job_id}          -> task_status
/// GET /task/{job_id}/result   -> task_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/task/{job_id}", get(tasks::task_status))
        .route("/task/{job_id}/result", get(tasks::task_result))
}
