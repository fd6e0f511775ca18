//! Repository for the `jobs` table.
//!
//! Uses the `JobStatus` enum from `seekreap_core::job` for every status
//! literal. Transitions are applied with a compare-and-set on the current
//! status, so two racing transitions out of the same state cannot both win.

use sqlx::PgPool;
use seekreap_core::error::CoreError;
use seekreap_core::forwarding::ForwardOutcome;
use seekreap_core::job::{
    transition_stamps, validate_failure_reason, validate_job_transition, JobStatus, JobType,
};
use seekreap_core::types::DbId;

use crate::error::RepoResult;
use crate::models::job::{CreateJob, Job, JobListQuery, JobSummary, PrecheckJob, UpdateJobStatus};
use crate::{clamp_limit, clamp_offset};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, creator_id, content_id, job_type, status, params, result, failure_reason, \
    forward_status, forward_detail, correlation_id, \
    created_at, started_at, completed_at, updated_at";

/// Column list for [`JobSummary`] rows.
const SUMMARY_COLUMNS: &str = "\
    id, creator_id, content_id, job_type, status, forward_status, \
    created_at, started_at, completed_at";

/// Provides CRUD and lifecycle operations for submission jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new job. Jobs always start in `pending`.
    pub async fn create(pool: &PgPool, input: &CreateJob) -> RepoResult<Job> {
        if input.content_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "content descriptor must not be empty".to_string(),
            )
            .into());
        }

        let query = format!(
            "INSERT INTO jobs (creator_id, content_id, job_type, status, params) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(input.creator_id)
            .bind(&input.content_id)
            .bind(input.job_type.as_str())
            .bind(JobStatus::Pending.as_str())
            .bind(&input.params)
            .fetch_one(pool)
            .await?;
        Ok(job)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List job summaries newest-first (ties broken by ID, highest first)
    /// with optional filters and pagination.
    pub async fn list(pool: &PgPool, params: &JobListQuery) -> Result<Vec<JobSummary>, sqlx::Error> {
        let limit = clamp_limit(params.limit);
        let offset = clamp_offset(params.offset);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }

        if params.job_type.is_some() {
            conditions.push(format!("job_type = ${bind_idx}"));
            bind_idx += 1;
        }

        if params.creator_id.is_some() {
            conditions.push(format!(
                "creator_id = (SELECT id FROM creators WHERE legacy_id = ${bind_idx})"
            ));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM jobs \
             {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, JobSummary>(&query);

        if let Some(status) = params.status {
            q = q.bind(status.as_str());
        }
        if let Some(job_type) = params.job_type {
            q = q.bind(job_type.as_str());
        }
        if let Some(creator) = &params.creator_id {
            q = q.bind(creator);
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// A creator's pre-flag jobs, newest-first. Unknown creators yield an
    /// empty list.
    pub async fn list_prechecks_for_creator(
        pool: &PgPool,
        legacy_id: &str,
    ) -> Result<Vec<PrecheckJob>, sqlx::Error> {
        sqlx::query_as::<_, PrecheckJob>(
            "SELECT j.id, j.content_id, j.status, j.created_at, j.completed_at, \
                 CASE WHEN jsonb_typeof(j.result -> 'overall_risk_score') = 'number' \
                      THEN (j.result ->> 'overall_risk_score')::DOUBLE PRECISION \
                 END AS overall_risk_score \
             FROM jobs j \
             JOIN creators c ON c.id = j.creator_id \
             WHERE c.legacy_id = $1 AND j.job_type = $2 \
             ORDER BY j.created_at DESC, j.id DESC",
        )
        .bind(legacy_id)
        .bind(JobType::PreFlag.as_str())
        .fetch_all(pool)
        .await
    }

    /// Move a job to `input.status`.
    ///
    /// Refuses edges outside the lifecycle table with `InvalidTransition`,
    /// enforces the failure-reason rule, and stamps `started_at` /
    /// `completed_at` once. A `result` may only accompany `completed`.
    pub async fn update_status(
        pool: &PgPool,
        job_id: DbId,
        input: &UpdateJobStatus,
    ) -> RepoResult<Job> {
        let current = Self::find_by_id(pool, job_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Job",
                id: job_id,
            })?;

        let from = current.status()?;
        let to = input.status;
        validate_job_transition(from, to)?;
        let failure_reason = validate_failure_reason(to, input.failure_reason.as_deref())?;

        if input.result.is_some() && to != JobStatus::Completed {
            return Err(CoreError::Validation(format!(
                "a result can only be recorded with status '{}'",
                JobStatus::Completed
            ))
            .into());
        }

        let stamps = transition_stamps(from, to);
        let query = format!(
            "UPDATE jobs SET \
                 status = $2, \
                 failure_reason = $3, \
                 started_at = CASE WHEN $4 THEN COALESCE(started_at, NOW()) ELSE started_at END, \
                 completed_at = CASE WHEN $5 THEN COALESCE(completed_at, NOW()) ELSE completed_at END, \
                 result = COALESCE($6, result) \
             WHERE id = $1 AND status = $7 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(to.as_str())
            .bind(failure_reason)
            .bind(stamps.sets_started_at)
            .bind(stamps.sets_completed_at)
            .bind(&input.result)
            .bind(from.as_str())
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(job) => {
                tracing::info!(job_id, from = %from, to = %to, "Job status updated");
                Ok(job)
            }
            // Lost the race: someone moved the job after we read it.
            None => Err(Self::lost_race(pool, job_id, to).await?.into()),
        }
    }

    /// Store the result payload of a completed job.
    pub async fn attach_result(
        pool: &PgPool,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> RepoResult<Job> {
        let query = format!(
            "UPDATE jobs SET result = $2 \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(result)
            .bind(JobStatus::Completed.as_str())
            .fetch_optional(pool)
            .await?;

        if let Some(job) = updated {
            tracing::info!(job_id, "Job result attached");
            return Ok(job);
        }

        match Self::find_by_id(pool, job_id).await? {
            None => Err(CoreError::NotFound {
                entity: "Job",
                id: job_id,
            }
            .into()),
            Some(job) => Err(CoreError::InvalidState(format!(
                "Job {job_id} is '{}'; results can only be attached to completed jobs",
                job.status
            ))
            .into()),
        }
    }

    /// Persist the outcome of forwarding a job to the processing tier.
    ///
    /// The correlation ID is written only if none is recorded yet.
    pub async fn record_forward_outcome(
        pool: &PgPool,
        job_id: DbId,
        outcome: &ForwardOutcome,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET \
                 forward_status = $2, \
                 forward_detail = $3, \
                 correlation_id = COALESCE(correlation_id, $4) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(outcome.status())
            .bind(outcome.detail())
            .bind(outcome.correlation_id())
            .fetch_optional(pool)
            .await
    }

    /// Build the error for a compare-and-set that matched no row.
    async fn lost_race(pool: &PgPool, job_id: DbId, to: JobStatus) -> Result<CoreError, sqlx::Error> {
        Ok(match Self::find_by_id(pool, job_id).await? {
            None => CoreError::NotFound {
                entity: "Job",
                id: job_id,
            },
            Some(job) => CoreError::InvalidTransition {
                entity: "Job",
                from: job.status,
                to: to.to_string(),
            },
        })
    }
}
