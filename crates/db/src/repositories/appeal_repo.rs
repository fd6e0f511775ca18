//! Repository for enforcement actions, appeals, status history and outcomes.
//!
//! Every mutation of an appeal runs in a single transaction together with
//! its history row, so the history is never out of step with the status.

use sqlx::{PgConnection, PgPool};
use seekreap_core::appeal::{
    validate_appeal_transition, validate_max_length, validate_outcome_presence, Actor,
    AppealStatus, INITIAL_SUBMISSION_NOTE, MAX_NOTE_LENGTH,
};
use seekreap_core::error::CoreError;
use seekreap_core::types::DbId;

use crate::error::RepoResult;
use crate::models::appeal::{
    Appeal, AppealDetail, AppealOutcome, AppealStatusHistory, AppealSubmission, CreateAppeal,
    CreateEnforcementAction, CreatorAppeal, EnforcementAction, OutcomeData, PendingAppeal,
    StatusChange,
};
use crate::repositories::{CreatorRepo, EvidenceRepo};

const ACTION_COLUMNS: &str = "\
    id, creator_id, video_id, video_title, action_type, policy_violated, \
    notified_at, decision_url, raw_notice, recorded_at";

const APPEAL_COLUMNS: &str = "\
    id, action_id, creator_id, appeal_channel, grounds, creator_statement, \
    status, submitted_at, updated_at";

const HISTORY_COLUMNS: &str = "id, appeal_id, old_status, new_status, changed_by, note, changed_at";

const OUTCOME_COLUMNS: &str = "\
    id, appeal_id, outcome, monetization_restored, distribution_restored, \
    platform_response, responded_at";

/// Provides appeal submission, moderation transitions and read models.
pub struct AppealRepo;

impl AppealRepo {
    /// Record an enforcement action and open an appeal against it.
    ///
    /// Resolves (or creates) the creator, takes one appeal credit, inserts
    /// the action and the appeal in `submitted`, and writes the initial
    /// `draft -> submitted` history row. All or nothing: when the creator
    /// has no credits left, nothing is written and `QuotaExceeded` is
    /// returned.
    pub async fn submit(
        pool: &PgPool,
        legacy_creator_id: &str,
        display_name: Option<&str>,
        action: &CreateEnforcementAction,
        appeal: &CreateAppeal,
    ) -> RepoResult<AppealSubmission> {
        let mut tx = pool.begin().await?;

        let creator = CreatorRepo::resolve_or_create_on(&mut *tx, legacy_creator_id).await?;

        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            CreatorRepo::set_display_name(&mut *tx, creator.id, name).await?;
        }

        let Some(remaining_credits) = CreatorRepo::consume_appeal_credit(&mut *tx, creator.id).await?
        else {
            tx.rollback().await?;
            tracing::info!(
                creator_id = creator.id,
                legacy_id = legacy_creator_id,
                "Appeal rejected: no credits left"
            );
            return Err(CoreError::QuotaExceeded(format!(
                "creator {legacy_creator_id} has no appeal credits remaining"
            ))
            .into());
        };

        let insert_action = format!(
            "INSERT INTO enforcement_actions \
                 (creator_id, video_id, video_title, action_type, policy_violated, \
                  notified_at, decision_url, raw_notice) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ACTION_COLUMNS}"
        );
        let enforcement_action = sqlx::query_as::<_, EnforcementAction>(&insert_action)
            .bind(creator.id)
            .bind(&action.video_id)
            .bind(&action.video_title)
            .bind(&action.action_type)
            .bind(&action.policy_violated)
            .bind(action.notified_at)
            .bind(&action.decision_url)
            .bind(&action.raw_notice)
            .fetch_one(&mut *tx)
            .await?;

        let insert_appeal = format!(
            "INSERT INTO appeals \
                 (action_id, creator_id, appeal_channel, grounds, creator_statement, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {APPEAL_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Appeal>(&insert_appeal)
            .bind(enforcement_action.id)
            .bind(creator.id)
            .bind(&appeal.appeal_channel)
            .bind(&appeal.grounds)
            .bind(&appeal.creator_statement)
            .bind(AppealStatus::Submitted.as_str())
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_history(
            &mut *tx,
            created.id,
            AppealStatus::Draft,
            AppealStatus::Submitted,
            Actor::Creator,
            Some(INITIAL_SUBMISSION_NOTE),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            appeal_id = created.id,
            action_id = enforcement_action.id,
            creator_id = creator.id,
            remaining_credits,
            "Appeal submitted"
        );

        Ok(AppealSubmission {
            appeal: created,
            enforcement_action,
            remaining_credits,
        })
    }

    /// Whether an appeal with `id` exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM appeals WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Find an appeal by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Appeal>, sqlx::Error> {
        let query = format!("SELECT {APPEAL_COLUMNS} FROM appeals WHERE id = $1");
        sqlx::query_as::<_, Appeal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a moderation (or creator) status change.
    ///
    /// The appeal row is locked for the duration so concurrent transitions
    /// serialize. Existence and the edge are checked before the outcome
    /// payload. Terminal transitions also write the outcome record.
    pub async fn transition(
        pool: &PgPool,
        appeal_id: DbId,
        change: &StatusChange<'_>,
    ) -> RepoResult<Appeal> {
        validate_max_length("note", change.note, MAX_NOTE_LENGTH)?;

        let mut tx = pool.begin().await?;

        let lock = format!("SELECT {APPEAL_COLUMNS} FROM appeals WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, Appeal>(&lock)
            .bind(appeal_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Appeal",
                id: appeal_id,
            })?;

        let from = current.status()?;
        validate_appeal_transition(from, change.to)?;
        validate_outcome_presence(change.to, change.outcome.is_some())?;
        if change.outcome.is_some_and(|o| o.outcome.trim().is_empty()) {
            return Err(CoreError::Validation("outcome_data.outcome is required".to_string()).into());
        }

        let update = format!(
            "UPDATE appeals SET status = $2 WHERE id = $1 RETURNING {APPEAL_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appeal>(&update)
            .bind(appeal_id)
            .bind(change.to.as_str())
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_history(&mut *tx, appeal_id, from, change.to, change.actor, change.note)
            .await?;

        if let Some(outcome) = change.outcome {
            Self::insert_outcome(&mut *tx, appeal_id, outcome).await?;
        }

        tx.commit().await?;

        tracing::info!(
            appeal_id,
            from = %from,
            to = %change.to,
            actor = %change.actor,
            "Appeal status changed"
        );

        Ok(updated)
    }

    /// The appeal with its action, creator, evidence, history and outcome.
    pub async fn find_detail(pool: &PgPool, appeal_id: DbId) -> Result<Option<AppealDetail>, sqlx::Error> {
        let Some(appeal) = Self::find_by_id(pool, appeal_id).await? else {
            return Ok(None);
        };

        let action_query = format!("SELECT {ACTION_COLUMNS} FROM enforcement_actions WHERE id = $1");
        let enforcement_action = sqlx::query_as::<_, EnforcementAction>(&action_query)
            .bind(appeal.action_id)
            .fetch_one(pool)
            .await?;

        let (creator_legacy_id, creator_display_name): (String, Option<String>) =
            sqlx::query_as("SELECT legacy_id, display_name FROM creators WHERE id = $1")
                .bind(appeal.creator_id)
                .fetch_one(pool)
                .await?;

        let evidence = EvidenceRepo::list_for_appeal(pool, appeal_id).await?;

        let history_query = format!(
            "SELECT {HISTORY_COLUMNS} FROM appeal_status_history \
             WHERE appeal_id = $1 ORDER BY changed_at DESC, id DESC"
        );
        let history = sqlx::query_as::<_, AppealStatusHistory>(&history_query)
            .bind(appeal_id)
            .fetch_all(pool)
            .await?;

        let outcome_query = format!("SELECT {OUTCOME_COLUMNS} FROM appeal_outcomes WHERE appeal_id = $1");
        let outcome = sqlx::query_as::<_, AppealOutcome>(&outcome_query)
            .bind(appeal_id)
            .fetch_optional(pool)
            .await?;

        Ok(Some(AppealDetail {
            appeal,
            enforcement_action,
            creator_legacy_id,
            creator_display_name,
            evidence,
            history,
            outcome,
        }))
    }

    /// A creator's appeals, newest first.
    pub async fn list_for_creator(
        pool: &PgPool,
        legacy_creator_id: &str,
    ) -> Result<Vec<CreatorAppeal>, sqlx::Error> {
        sqlx::query_as::<_, CreatorAppeal>(
            "SELECT a.id, a.action_id, a.status, a.appeal_channel, a.grounds, a.submitted_at, \
                    ea.video_id, ea.video_title, ea.action_type, \
                    o.outcome, o.monetization_restored \
             FROM appeals a \
             JOIN creators c ON c.id = a.creator_id \
             JOIN enforcement_actions ea ON ea.id = a.action_id \
             LEFT JOIN appeal_outcomes o ON o.appeal_id = a.id \
             WHERE c.legacy_id = $1 \
             ORDER BY a.submitted_at DESC, a.id DESC",
        )
        .bind(legacy_creator_id)
        .fetch_all(pool)
        .await
    }

    /// The moderation queue: open appeals, oldest first.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<PendingAppeal>, sqlx::Error> {
        sqlx::query_as::<_, PendingAppeal>(
            "SELECT a.id, a.action_id, a.status, a.appeal_channel, a.grounds, \
                    a.creator_statement, a.submitted_at, \
                    ea.video_id, ea.video_title, ea.action_type, \
                    c.legacy_id AS creator_legacy_id, c.display_name AS creator_display_name, \
                    COUNT(ev.id) AS evidence_count \
             FROM appeals a \
             JOIN creators c ON c.id = a.creator_id \
             JOIN enforcement_actions ea ON ea.id = a.action_id \
             LEFT JOIN appeal_evidence ev ON ev.appeal_id = a.id \
             WHERE a.status IN ($1, $2) \
             GROUP BY a.id, ea.id, c.id \
             ORDER BY a.submitted_at ASC, a.id ASC",
        )
        .bind(AppealStatus::Submitted.as_str())
        .bind(AppealStatus::UnderReview.as_str())
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    async fn insert_history(
        conn: &mut PgConnection,
        appeal_id: DbId,
        from: AppealStatus,
        to: AppealStatus,
        actor: Actor,
        note: Option<&str>,
    ) -> Result<AppealStatusHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO appeal_status_history (appeal_id, old_status, new_status, changed_by, note) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {HISTORY_COLUMNS}"
        );
        sqlx::query_as::<_, AppealStatusHistory>(&query)
            .bind(appeal_id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(actor.as_str())
            .bind(note)
            .fetch_one(&mut *conn)
            .await
    }

    async fn insert_outcome(
        conn: &mut PgConnection,
        appeal_id: DbId,
        outcome: &OutcomeData,
    ) -> Result<AppealOutcome, sqlx::Error> {
        let query = format!(
            "INSERT INTO appeal_outcomes \
                 (appeal_id, outcome, monetization_restored, distribution_restored, platform_response) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {OUTCOME_COLUMNS}"
        );
        sqlx::query_as::<_, AppealOutcome>(&query)
            .bind(appeal_id)
            .bind(outcome.outcome.trim())
            .bind(outcome.monetization_restored)
            .bind(outcome.distribution_restored)
            .bind(&outcome.platform_response)
            .fetch_one(&mut *conn)
            .await
    }
}
