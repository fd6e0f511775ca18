pub mod admin;
pub mod appeals;
pub mod creators;
pub mod health;
pub mod submissions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /submissions                                     list, create (multipart or JSON)
/// /submissions/{id}                                get
/// /submissions/{id}/results                        result payload (completed only)
///
/// /appeals                                         submit (POST)
/// /appeals/{id}                                    get with evidence, history, outcome
/// /appeals/{id}/evidence                           attach evidence (multipart POST)
///
/// /creators/{id}/appeals                           creator's appeals, newest first
/// /creators/{id}/dashboard                         aggregate counters
/// /creators/{id}/prechecks                         pre-flag jobs
///
/// /admin/submissions/{id}/status                   lifecycle transition (PATCH)
/// /admin/submissions/{id}/result                   attach result (PUT)
/// /admin/appeals/pending                           moderation queue, oldest first
/// /admin/appeals/{id}/status                       moderator transition (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/submissions", submissions::router())
        .nest("/appeals", appeals::router())
        .nest("/creators", creators::router())
        .nest("/admin", admin::router())
}
