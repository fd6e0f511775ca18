//! Handlers for creator-scoped aggregations under `/creators/{id}`.
//!
//! `{id}` is the legacy creator ID. Unknown creators get empty lists or a
//! zeroed dashboard, never 404, and are not created by these reads.

use axum::extract::State;
use axum::Json;
use seekreap_db::models::appeal::CreatorAppeal;
use seekreap_db::models::dashboard::CreatorDashboard;
use seekreap_db::models::job::PrecheckJob;
use seekreap_db::repositories::{AppealRepo, DashboardRepo, JobRepo};

use crate::error::AppResult;
use crate::extract::AppPath;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/creators/{id}/appeals
pub async fn list_appeals(
    State(state): State<AppState>,
    AppPath(legacy_id): AppPath<String>,
) -> AppResult<Json<DataResponse<Vec<CreatorAppeal>>>> {
    let appeals = AppealRepo::list_for_creator(&state.pool, legacy_id.trim()).await?;
    Ok(Json(DataResponse { data: appeals }))
}

/// GET /api/v1/creators/{id}/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    AppPath(legacy_id): AppPath<String>,
) -> AppResult<Json<DataResponse<CreatorDashboard>>> {
    let dashboard = DashboardRepo::creator_dashboard(&state.pool, legacy_id.trim()).await?;
    Ok(Json(DataResponse { data: dashboard }))
}

/// GET /api/v1/creators/{id}/prechecks
///
/// Pre-flag jobs, newest first, with `overall_risk_score` lifted from the
/// result payload.
pub async fn list_prechecks(
    State(state): State<AppState>,
    AppPath(legacy_id): AppPath<String>,
) -> AppResult<Json<DataResponse<Vec<PrecheckJob>>>> {
    let prechecks = JobRepo::list_prechecks_for_creator(&state.pool, legacy_id.trim()).await?;
    Ok(Json(DataResponse { data: prechecks }))
}
