//! Route definitions for the `/admin` surface.

use axum::routing::{get, patch, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// PATCH  /submissions/{id}/status  -> update_submission_status
/// PUT    /submissions/{id}/result  -> attach_submission_result
/// GET    /appeals/pending          -> list_pending_appeals
/// PATCH  /appeals/{id}/status      -> transition_appeal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/submissions/{id}/status",
            patch(admin::update_submission_status),
        )
        .route(
            "/submissions/{id}/result",
            put(admin::attach_submission_result),
        )
        .route("/appeals/pending", get(admin::list_pending_appeals))
        .route("/appeals/{id}/status", patch(admin::transition_appeal))
}
