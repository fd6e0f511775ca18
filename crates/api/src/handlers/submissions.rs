//! Handlers for the `/submissions` resource.
//!
//! `POST /submissions` accepts either a multipart form (file upload) or a
//! JSON body (URL or direct content descriptor). [`SubmissionBody`] picks
//! the parser from the `Content-Type` header.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use seekreap_core::creator::{legacy_id_from_json, legacy_id_from_text};
use seekreap_core::error::CoreError;
use seekreap_core::job::JobStatus;
use seekreap_core::submission::SubmissionInput;
use seekreap_core::types::{DbId, Timestamp};
use seekreap_db::models::job::{Job, JobListQuery, JobSummary};
use seekreap_db::repositories::JobRepo;

use crate::engine::gateway::{self, Submission};
use crate::error::{AppError, AppResult};
use crate::extract::{AppPath, AppQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field names that carry the video file.
const FILE_FIELDS: &[&str] = &["video", "video_file", "file"];

/// Form and JSON field names that carry a URL.
const URL_FIELDS: &[&str] = &["url", "video_url", "youtube_url"];

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

/// JSON form of a submission.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitJson {
    #[serde(default, alias = "creatorId")]
    pub creator_id: Option<serde_json::Value>,
    #[serde(default, alias = "video_url", alias = "youtube_url")]
    pub url: Option<String>,
    #[serde(default, alias = "contentId")]
    pub content_id: Option<String>,
    #[serde(default, alias = "jobType")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

/// A submission body in any accepted encoding.
#[derive(Debug)]
pub struct SubmissionBody(pub Submission);

impl FromRequest<AppState> for SubmissionBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            return from_multipart(multipart, state).await.map(SubmissionBody);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        // An empty body is "no input", which the gateway reports.
        let body: SubmitJson = if bytes.iter().all(u8::is_ascii_whitespace) {
            SubmitJson::default()
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?
        };

        let creator = legacy_id_from_json(body.creator_id.as_ref())?;
        Ok(SubmissionBody(Submission {
            creator_legacy_id: creator.unwrap_or_else(|| state.config.default_creator_id.clone()),
            input: SubmissionInput {
                upload: None,
                url: body.url,
                content_id: body.content_id,
                job_type: body.job_type,
                params: body.params,
            },
            file_data: None,
        }))
    }
}

/// Collect the submission fields from a multipart form.
async fn from_multipart(mut multipart: Multipart, state: &AppState) -> AppResult<Submission> {
    let mut input = SubmissionInput::default();
    let mut creator: Option<String> = None;
    let mut file_data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if FILE_FIELDS.contains(&name.as_str()) {
            if file_data.is_some() {
                return Err(CoreError::Validation(
                    "only one file may be uploaded per submission".to_string(),
                )
                .into());
            }
            let filename = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            // Browsers send an empty part when no file was chosen.
            if filename.is_empty() && data.is_empty() {
                continue;
            }
            input.upload = Some(state.uploads.plan_video(
                &filename,
                content_type,
                data.len() as u64,
            ));
            file_data = Some(data);
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        match name.as_str() {
            n if URL_FIELDS.contains(&n) => input.url = Some(text),
            "creator_id" | "creatorId" => creator = legacy_id_from_text(Some(&text))?,
            "content_id" | "contentId" => input.content_id = Some(text),
            "job_type" | "jobType" => input.job_type = Some(text),
            "params" => {
                let params = serde_json::from_str(&text).map_err(|e| {
                    CoreError::Validation(format!("params must be valid JSON: {e}"))
                })?;
                input.params = Some(params);
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(Submission {
        creator_legacy_id: creator.unwrap_or_else(|| state.config.default_creator_id.clone()),
        input,
        file_data,
    })
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Returned by `POST /submissions`.
#[derive(Debug, Serialize)]
pub struct SubmissionAccepted {
    pub job_id: DbId,
    pub status: String,
    pub content_id: String,
    pub job_type: String,
    pub forward_status: String,
    pub correlation_id: Option<String>,
    pub created_at: Timestamp,
}

impl From<Job> for SubmissionAccepted {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            content_id: job.content_id,
            job_type: job.job_type,
            forward_status: job.forward_status,
            correlation_id: job.correlation_id,
            created_at: job.created_at,
        }
    }
}

/// Returned by `GET /submissions/{id}/results`.
#[derive(Debug, Serialize)]
pub struct JobResult {
    pub job_id: DbId,
    pub status: String,
    pub completed_at: Option<Timestamp>,
    pub result: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/submissions
///
/// Create a pending job from an upload, a URL or a direct content
/// descriptor. Returns 201 even when the processing tier could not be
/// reached; `forward_status` says what happened.
pub async fn create_submission(
    State(state): State<AppState>,
    SubmissionBody(submission): SubmissionBody,
) -> AppResult<impl IntoResponse> {
    let job = gateway::submit(&state, submission).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionAccepted::from(job),
        }),
    ))
}

/// GET /api/v1/submissions
///
/// Job summaries, newest first. Filters: `status`, `job_type`,
/// `creator_id` (legacy ID), `limit`, `offset`.
pub async fn list_submissions(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<JobListQuery>,
) -> AppResult<Json<DataResponse<Vec<JobSummary>>>> {
    let jobs = JobRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/submissions/{id}
pub async fn get_submission(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = find_job(&state, id).await?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/v1/submissions/{id}/results
///
/// The stored result payload. 409 while the job is not completed.
pub async fn get_submission_results(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<JobResult>>> {
    let job = find_job(&state, id).await?;

    if job.status()? != JobStatus::Completed {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "Job {id} is '{}'; results are available once it is completed",
            job.status
        ))));
    }

    Ok(Json(DataResponse {
        data: JobResult {
            job_id: job.id,
            status: job.status,
            completed_at: job.completed_at,
            result: job.result,
        },
    }))
}

pub(crate) async fn find_job(state: &AppState, id: DbId) -> AppResult<Job> {
    JobRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Job", id }))
}
