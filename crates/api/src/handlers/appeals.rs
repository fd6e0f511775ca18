//! Handlers for the `/appeals` resource.

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use seekreap_core::appeal::{
    or_default, validate_max_length, DEFAULT_EVIDENCE_TYPE, MAX_NOTE_LENGTH,
};
use seekreap_core::error::CoreError;
use seekreap_core::types::DbId;
use seekreap_db::models::appeal::{
    AppealDetail, AppealSubmission, CreateEvidence, SubmitAppeal,
};
use seekreap_db::repositories::{AppealRepo, EvidenceRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field names that carry the evidence file.
const EVIDENCE_FILE_FIELDS: &[&str] = &["evidence", "file"];

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/appeals
///
/// Record an enforcement action and appeal it, spending one credit.
/// Returns 403 `QUOTA_EXCEEDED` when the creator has none left.
pub async fn submit_appeal(
    State(state): State<AppState>,
    AppJson(body): AppJson<SubmitAppeal>,
) -> AppResult<Json<DataResponse<AppealSubmission>>> {
    let legacy_id = body
        .legacy_creator_id()?
        .unwrap_or_else(|| state.config.default_creator_id.clone());
    let display_name = body.channel_name.clone();
    let (action, appeal) = body.into_parts()?;

    let submission = AppealRepo::submit(
        &state.pool,
        &legacy_id,
        display_name.as_deref(),
        &action,
        &appeal,
    )
    .await?;

    Ok(Json(DataResponse { data: submission }))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/appeals/{id}
///
/// The appeal with its enforcement action, evidence and history (both
/// newest first) and the outcome once closed.
pub async fn get_appeal(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<AppealDetail>>> {
    let detail = AppealRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appeal",
            id,
        }))?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// POST /api/v1/appeals/{id}/evidence
///
/// Multipart form with a file in `evidence` (or `file`) plus optional
/// `evidence_type` and `description`. The file is stored under
/// `UPLOAD_DIR/evidence`; only its reference is recorded.
pub async fn add_evidence(
    State(state): State<AppState>,
    AppPath(appeal_id): AppPath<DbId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let mut multipart = multipart?;
    let mut file: Option<(String, Bytes)> = None;
    let mut evidence_type: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if EVIDENCE_FILE_FIELDS.contains(&name.as_str()) {
            let filename = field.file_name().unwrap_or("evidence").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((filename, data));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        match name.as_str() {
            "evidence_type" | "evidenceType" => evidence_type = Some(text),
            "description" => description = Some(text),
            _ => {} // ignore unknown fields
        }
    }

    let (filename, data) = file
        .filter(|(_, data)| !data.is_empty())
        .ok_or_else(|| CoreError::Validation("No evidence file uploaded".to_string()))?;
    validate_max_length("description", description.as_deref(), MAX_NOTE_LENGTH)?;

    // Avoid writing files for appeals that do not exist.
    if !AppealRepo::exists(&state.pool, appeal_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Appeal",
            id: appeal_id,
        }));
    }

    let file_ref = state
        .uploads
        .store_evidence(&filename, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store evidence: {e}")))?;

    let input = CreateEvidence {
        evidence_type: or_default(evidence_type.as_deref(), DEFAULT_EVIDENCE_TYPE),
        file_ref,
        original_filename: Some(filename),
        description: description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    };

    let evidence = match EvidenceRepo::create(&state.pool, appeal_id, &input).await {
        Ok(evidence) => evidence,
        Err(e) => {
            state.uploads.discard(state.uploads.resolve(&input.file_ref)).await;
            return Err(e.into());
        }
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: evidence })))
}
