//! Route definitions for the `/appeals` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::appeals;
use crate::state::AppState;

/// Routes mounted at `/appeals`.
///
/// ```text
/// POST   /                -> submit_appeal
/// GET    /{id}            -> get_appeal
/// POST   /{id}/evidence   -> add_evidence
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(appeals::submit_appeal))
        .route("/{id}", get(appeals::get_appeal))
        .route("/{id}/evidence", post(appeals::add_evidence))
}
