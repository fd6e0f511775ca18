//! Handlers for the `/admin` surface: job lifecycle updates driven by the
//! processing tier, and the appeal moderation queue.

use axum::extract::State;
use axum::Json;
use seekreap_core::appeal::Actor;
use seekreap_core::types::DbId;
use seekreap_db::models::appeal::{Appeal, PendingAppeal, StatusChange, TransitionAppeal};
use seekreap_db::models::job::{AttachResult, Job, UpdateJobStatus};
use seekreap_db::repositories::{AppealRepo, JobRepo};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// PATCH /api/v1/admin/submissions/{id}/status
///
/// Move a job along its lifecycle. Returns 409 `INVALID_TRANSITION` for
/// edges the lifecycle does not allow.
pub async fn update_submission_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateJobStatus>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = JobRepo::update_status(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: job }))
}

/// PUT /api/v1/admin/submissions/{id}/result
///
/// Store the result payload of a completed job.
pub async fn attach_submission_result(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AttachResult>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = JobRepo::attach_result(&state.pool, id, &input.result).await?;
    Ok(Json(DataResponse { data: job }))
}

// ---------------------------------------------------------------------------
// Appeals
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/appeals/pending
///
/// Open appeals, oldest first.
pub async fn list_pending_appeals(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PendingAppeal>>>> {
    let queue = AppealRepo::list_pending(&state.pool).await?;
    Ok(Json(DataResponse { data: queue }))
}

/// PATCH /api/v1/admin/appeals/{id}/status
///
/// Moderator status change. Closing an appeal requires `outcome_data`.
pub async fn transition_appeal(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<TransitionAppeal>,
) -> AppResult<Json<DataResponse<Appeal>>> {
    let change = StatusChange {
        to: input.status,
        actor: Actor::Moderator,
        note: input.note.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        outcome: input.outcome_data.as_ref(),
    };
    let appeal = AppealRepo::transition(&state.pool, id, &change).await?;
    Ok(Json(DataResponse { data: appeal }))
}
