//! Submission job entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use seekreap_core::error::CoreError;
use seekreap_core::job::{JobStatus, JobType};
use seekreap_core::types::{DbId, Timestamp};

/// A row from the `jobs` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub creator_id: DbId,
    pub content_id: String,
    pub job_type: String,
    pub status: String,
    pub params: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub failure_reason: Option<String>,
    pub forward_status: String,
    pub forward_detail: Option<String>,
    pub correlation_id: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl Job {
    /// Parse the stored status literal. An unknown literal means the row is
    /// corrupt, not that the caller sent bad input.
    pub fn status(&self) -> Result<JobStatus, CoreError> {
        JobStatus::parse(&self.status).map_err(|_| {
            CoreError::Internal(format!(
                "job {} has unrecognized status '{}'",
                self.id, self.status
            ))
        })
    }
}

/// Lightweight listing row for `GET /submissions`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct JobSummary {
    pub id: DbId,
    pub creator_id: DbId,
    pub content_id: String,
    pub job_type: String,
    pub status: String,
    pub forward_status: String,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// A creator's pre-flag job with the risk score lifted out of its result.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PrecheckJob {
    pub id: DbId,
    pub content_id: String,
    pub status: String,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub overall_risk_score: Option<f64>,
}

/// Input for inserting a new job. New jobs are always `pending`.
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub creator_id: DbId,
    pub content_id: String,
    pub job_type: JobType,
    pub params: serde_json::Value,
}

/// Body of `PATCH /admin/submissions/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobStatus {
    pub status: JobStatus,
    #[serde(default, alias = "failureReason")]
    pub failure_reason: Option<String>,
    /// Result payload stored together with a `completed` transition.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Body of `PUT /admin/submissions/{id}/result`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachResult {
    pub result: serde_json::Value,
}

/// Query parameters for `GET /submissions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    pub status: Option<JobStatus>,
    pub job_type: Option<JobType>,
    /// Legacy creator identifier.
    pub creator_id: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
