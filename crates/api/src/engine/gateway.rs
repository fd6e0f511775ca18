//! Submission gateway: turns one accepted request into a pending job.
//!
//! Order of effects:
//! 1. classify the input into exactly one content shape
//! 2. resolve (or create) the creator
//! 3. write the uploaded file, if any
//! 4. insert the job in `pending`
//! 5. forward it to the processing tier and record the outcome
//!
//! Steps 1-4 fail the request. Step 5 never does.

use axum::body::Bytes;
use seekreap_core::forwarding::ForwardOutcome;
use seekreap_core::submission::{classify, ContentSource, SubmissionInput};
use seekreap_db::models::job::{CreateJob, Job};
use seekreap_db::repositories::{CreatorRepo, JobRepo};

use crate::engine::forwarder::ForwardRequest;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A parsed submission request.
#[derive(Debug, Default)]
pub struct Submission {
    pub creator_legacy_id: String,
    pub input: SubmissionInput,
    /// File contents when `input.upload` is set.
    pub file_data: Option<Bytes>,
}

/// Accept a submission and return the locally stored job.
///
/// The returned job reflects the forwarding outcome when it could be
/// recorded; otherwise it is the job as inserted.
pub async fn submit(state: &AppState, submission: Submission) -> AppResult<Job> {
    let Submission {
        creator_legacy_id,
        input,
        file_data,
    } = submission;

    let source = classify(input)?;
    let creator = CreatorRepo::resolve_or_create(&state.pool, &creator_legacy_id).await?;

    let written_path = match (&source, file_data) {
        (ContentSource::Upload(upload), Some(data)) => {
            state
                .uploads
                .write(&upload.file_path, &data)
                .await
                .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;
            Some(upload.file_path.clone())
        }
        (ContentSource::Upload(_), None) => {
            return Err(AppError::InternalError(
                "upload metadata without file contents".to_string(),
            ))
        }
        _ => None,
    };

    let spec = source.into_job_spec(chrono::Utc::now());
    let input = CreateJob {
        creator_id: creator.id,
        content_id: spec.content_id,
        job_type: spec.job_type,
        params: spec.params,
    };

    let job = match JobRepo::create(&state.pool, &input).await {
        Ok(job) => job,
        Err(e) => {
            if let Some(path) = written_path {
                state.uploads.discard(path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        job_id = job.id,
        creator_id = creator.id,
        job_type = %job.job_type,
        content_id = %job.content_id,
        "Job submitted"
    );

    Ok(forward(state, &creator_legacy_id, job).await)
}

/// Notify the processing tier and persist the outcome. Never fails.
async fn forward(state: &AppState, creator_legacy_id: &str, job: Job) -> Job {
    let request = ForwardRequest {
        job_id: job.id,
        creator_id: creator_legacy_id.to_string(),
        content_id: job.content_id.clone(),
        job_type: job.job_type.clone(),
        params: job.params.clone(),
    };

    let outcome = state.processing_tier.forward(&request).await;
    match &outcome {
        ForwardOutcome::NotAttempted => {
            tracing::debug!(job_id = job.id, "Processing tier disabled, job not forwarded");
        }
        ForwardOutcome::Forwarded { correlation_id } => {
            tracing::info!(
                job_id = job.id,
                correlation_id = correlation_id.as_deref().unwrap_or(""),
                "Job forwarded to processing tier"
            );
        }
        ForwardOutcome::Unreachable { reason } | ForwardOutcome::Rejected { reason } => {
            tracing::warn!(
                job_id = job.id,
                forward_status = outcome.status(),
                reason = %reason,
                "Forwarding to processing tier failed, job stays pending"
            );
        }
    }

    match JobRepo::record_forward_outcome(&state.pool, job.id, &outcome).await {
        Ok(Some(updated)) => updated,
        Ok(None) => job,
        Err(e) => {
            tracing::error!(job_id = job.id, error = %e, "Failed to record forward outcome");
            job
        }
    }
}
