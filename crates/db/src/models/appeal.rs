//! Enforcement action, appeal, evidence, status history and outcome models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use seekreap_core::appeal::{
    or_default, validate_max_length, validate_required, Actor, AppealStatus,
    DEFAULT_APPEAL_CHANNEL, DEFAULT_GROUNDS, MAX_STATEMENT_LENGTH,
};
use seekreap_core::creator::legacy_id_from_json;
use seekreap_core::error::CoreError;
use seekreap_core::types::{DbId, Timestamp};

/// A row from the `enforcement_actions` table. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct EnforcementAction {
    pub id: DbId,
    pub creator_id: DbId,
    pub video_id: String,
    pub video_title: Option<String>,
    pub action_type: String,
    pub policy_violated: Option<String>,
    pub notified_at: Option<Timestamp>,
    pub decision_url: Option<String>,
    pub raw_notice: Option<String>,
    pub recorded_at: Timestamp,
}

/// A row from the `appeals` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Appeal {
    pub id: DbId,
    pub action_id: DbId,
    pub creator_id: DbId,
    pub appeal_channel: String,
    pub grounds: String,
    pub creator_statement: Option<String>,
    pub status: String,
    pub submitted_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Appeal {
    pub fn status(&self) -> Result<AppealStatus, CoreError> {
        AppealStatus::parse(&self.status).map_err(|_| {
            CoreError::Internal(format!(
                "appeal {} has unrecognized status '{}'",
                self.id, self.status
            ))
        })
    }
}

/// A row from the `appeal_evidence` table. Append-only.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AppealEvidence {
    pub id: DbId,
    pub appeal_id: DbId,
    pub evidence_type: String,
    pub file_ref: String,
    pub original_filename: Option<String>,
    pub description: Option<String>,
    pub added_at: Timestamp,
}

/// A row from the `appeal_status_history` table. Append-only.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AppealStatusHistory {
    pub id: DbId,
    pub appeal_id: DbId,
    pub old_status: String,
    pub new_status: String,
    pub changed_by: String,
    pub note: Option<String>,
    pub changed_at: Timestamp,
}

/// A row from the `appeal_outcomes` table. At most one per appeal.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AppealOutcome {
    pub id: DbId,
    pub appeal_id: DbId,
    pub outcome: String,
    pub monetization_restored: bool,
    pub distribution_restored: bool,
    pub platform_response: Option<String>,
    pub responded_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /appeals`: the enforcement notice plus the appeal itself.
///
/// Field aliases accept the payloads of older clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitAppeal {
    #[serde(default, alias = "creatorId")]
    pub creator_id: Option<serde_json::Value>,
    /// Channel name stored on the creator when given.
    #[serde(default, alias = "channelName", alias = "display_name")]
    pub channel_name: Option<String>,

    #[serde(default, alias = "youtube_video_id", alias = "videoId")]
    pub video_id: String,
    #[serde(default, alias = "videoTitle")]
    pub video_title: Option<String>,
    #[serde(default, alias = "actionType")]
    pub action_type: String,
    #[serde(default, alias = "policyViolated")]
    pub policy_violated: Option<String>,
    #[serde(default, alias = "youtube_notified_at", alias = "notifiedAt")]
    pub notified_at: Option<Timestamp>,
    #[serde(default, alias = "youtube_decision_url", alias = "decisionUrl")]
    pub decision_url: Option<String>,
    #[serde(default, alias = "raw_yt_notice", alias = "rawNotice")]
    pub raw_notice: Option<String>,

    #[serde(default, alias = "appealChannel")]
    pub appeal_channel: Option<String>,
    #[serde(default)]
    pub grounds: Option<String>,
    #[serde(default, alias = "creatorStatement")]
    pub creator_statement: Option<String>,
}

impl SubmitAppeal {
    /// Legacy creator ID carried in the body, accepting strings or numbers.
    ///
    /// `Ok(None)` means the field was absent; a present but blank value is
    /// rejected.
    pub fn legacy_creator_id(&self) -> Result<Option<String>, CoreError> {
        legacy_id_from_json(self.creator_id.as_ref())
    }

    /// Validate the body and apply defaults.
    pub fn into_parts(self) -> Result<(CreateEnforcementAction, CreateAppeal), CoreError> {
        validate_required("video_id", &self.video_id)?;
        validate_required("action_type", &self.action_type)?;
        validate_max_length(
            "creator_statement",
            self.creator_statement.as_deref(),
            MAX_STATEMENT_LENGTH,
        )?;

        let action = CreateEnforcementAction {
            video_id: self.video_id.trim().to_string(),
            video_title: non_blank(self.video_title),
            action_type: self.action_type.trim().to_string(),
            policy_violated: non_blank(self.policy_violated),
            notified_at: self.notified_at,
            decision_url: non_blank(self.decision_url),
            raw_notice: self.raw_notice,
        };
        let appeal = CreateAppeal {
            appeal_channel: or_default(self.appeal_channel.as_deref(), DEFAULT_APPEAL_CHANNEL),
            grounds: or_default(self.grounds.as_deref(), DEFAULT_GROUNDS),
            creator_statement: self.creator_statement,
        };
        Ok((action, appeal))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Enforcement action fields after validation.
#[derive(Debug, Clone)]
pub struct CreateEnforcementAction {
    pub video_id: String,
    pub video_title: Option<String>,
    pub action_type: String,
    pub policy_violated: Option<String>,
    pub notified_at: Option<Timestamp>,
    pub decision_url: Option<String>,
    pub raw_notice: Option<String>,
}

/// Appeal fields after defaults have been applied.
#[derive(Debug, Clone)]
pub struct CreateAppeal {
    pub appeal_channel: String,
    pub grounds: String,
    pub creator_statement: Option<String>,
}

/// Everything `submitAppeal` produced, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AppealSubmission {
    pub appeal: Appeal,
    pub enforcement_action: EnforcementAction,
    pub remaining_credits: i32,
}

/// Outcome recorded on a terminal transition.
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeData {
    pub outcome: String,
    #[serde(default)]
    pub monetization_restored: bool,
    #[serde(default)]
    pub distribution_restored: bool,
    #[serde(default, alias = "yt_response_text")]
    pub platform_response: Option<String>,
}

/// Body of `PATCH /admin/appeals/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionAppeal {
    pub status: AppealStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "outcomeData")]
    pub outcome_data: Option<OutcomeData>,
}

/// Evidence metadata written after the file has been stored.
#[derive(Debug, Clone)]
pub struct CreateEvidence {
    pub evidence_type: String,
    pub file_ref: String,
    pub original_filename: Option<String>,
    pub description: Option<String>,
}

/// A status change as applied by the repository.
#[derive(Debug, Clone)]
pub struct StatusChange<'a> {
    pub to: AppealStatus,
    pub actor: Actor,
    pub note: Option<&'a str>,
    pub outcome: Option<&'a OutcomeData>,
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// `GET /appeals/{id}`: the appeal with everything it owns.
#[derive(Debug, Clone, Serialize)]
pub struct AppealDetail {
    pub appeal: Appeal,
    pub enforcement_action: EnforcementAction,
    pub creator_legacy_id: String,
    pub creator_display_name: Option<String>,
    /// Newest first.
    pub evidence: Vec<AppealEvidence>,
    /// Newest first.
    pub history: Vec<AppealStatusHistory>,
    pub outcome: Option<AppealOutcome>,
}

/// One entry of a creator's appeal list.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CreatorAppeal {
    pub id: DbId,
    pub action_id: DbId,
    pub status: String,
    pub appeal_channel: String,
    pub grounds: String,
    pub submitted_at: Timestamp,
    pub video_id: String,
    pub video_title: Option<String>,
    pub action_type: String,
    pub outcome: Option<String>,
    pub monetization_restored: Option<bool>,
}

/// One entry of the moderation queue.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PendingAppeal {
    pub id: DbId,
    pub action_id: DbId,
    pub status: String,
    pub appeal_channel: String,
    pub grounds: String,
    pub creator_statement: Option<String>,
    pub submitted_at: Timestamp,
    pub video_id: String,
    pub video_title: Option<String>,
    pub action_type: String,
    pub creator_legacy_id: String,
    pub creator_display_name: Option<String>,
    pub evidence_count: i64,
}
