//! Route definitions for creator-scoped reads.

use axum::routing::get;
use axum::Router;

use crate::handlers::creators;
use crate::state::AppState;

/// Routes mounted at `/creators`. `{id}` is the legacy creator ID.
///
/// ```text
/// GET    /{id}/appeals    -> list_appeals
/// GET    /{id}/dashboard  -> dashboard
/// GET    /{id}/prechecks  -> list_prechecks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/appeals", get(creators::list_appeals))
        .route("/{id}/dashboard", get(creators::dashboard))
        .route("/{id}/prechecks", get(creators::list_prechecks))
}
