//! Appeal workflow constants, status machine and validation (creator
//! appeals against platform enforcement actions).

use crate::error::CoreError;

crate::define_text_enum! {
    /// Appeal lifecycle status.
    AppealStatus("appeal status") {
        Draft = "draft",
        Submitted = "submitted",
        UnderReview = "under_review",
        Upheld = "upheld",
        Overturned = "overturned",
        Denied = "denied",
    }
}

crate::define_text_enum! {
    /// Who caused an appeal status change.
    Actor("actor") {
        Creator = "creator",
        Moderator = "moderator",
    }
}

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Appeal credits granted to a newly created creator.
pub const DEFAULT_APPEAL_CREDITS: i32 = 3;

/// Channel recorded when the creator does not name one.
pub const DEFAULT_APPEAL_CHANNEL: &str = "youtube_studio";

/// Grounds recorded when the creator does not name any.
pub const DEFAULT_GROUNDS: &str = "misclassification";

/// Evidence type recorded when the uploader does not name one.
pub const DEFAULT_EVIDENCE_TYPE: &str = "other";

/// Note attached to the history row written on creation.
pub const INITIAL_SUBMISSION_NOTE: &str = "Initial submission";

/// Maximum length of the creator's statement.
pub const MAX_STATEMENT_LENGTH: usize = 10_000;

/// Maximum length of a moderator note or platform response.
pub const MAX_NOTE_LENGTH: usize = 10_000;

/// Statuses that sit in the moderation queue.
pub const OPEN_STATUSES: &[AppealStatus] = &[AppealStatus::Submitted, AppealStatus::UnderReview];

/// Statuses that close an appeal and carry an outcome.
pub const TERMINAL_STATUSES: &[AppealStatus] = &[
    AppealStatus::Upheld,
    AppealStatus::Overturned,
    AppealStatus::Denied,
];

impl AppealStatus {
    pub fn is_open(self) -> bool {
        OPEN_STATUSES.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        TERMINAL_STATUSES.contains(&self)
    }

    /// Statuses reachable in one step from `self`.
    ///
    /// A moderator may close a `submitted` appeal without putting it under
    /// review first.
    pub fn successors(self) -> &'static [AppealStatus] {
        match self {
            AppealStatus::Draft => &[AppealStatus::Submitted],
            AppealStatus::Submitted => &[
                AppealStatus::UnderReview,
                AppealStatus::Upheld,
                AppealStatus::Overturned,
                AppealStatus::Denied,
            ],
            AppealStatus::UnderReview => TERMINAL_STATUSES,
            AppealStatus::Upheld | AppealStatus::Overturned | AppealStatus::Denied => &[],
        }
    }
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

pub fn validate_appeal_transition(from: AppealStatus, to: AppealStatus) -> Result<(), CoreError> {
    if from.successors().contains(&to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            entity: "Appeal",
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Terminal transitions must record an outcome; non-terminal ones must not.
pub fn validate_outcome_presence(to: AppealStatus, has_outcome: bool) -> Result<(), CoreError> {
    match (to.is_terminal(), has_outcome) {
        (true, false) => Err(CoreError::Validation(format!(
            "outcome_data is required when closing an appeal as '{to}'"
        ))),
        (false, true) => Err(CoreError::Validation(format!(
            "outcome_data is only accepted for terminal statuses, not '{to}'"
        ))),
        _ => Ok(()),
    }
}

/// A required free-text field must contain something other than whitespace.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Bound an optional free-text field by character count.
pub fn validate_max_length(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CoreError::Validation(format!(
            "{field} exceeds {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Trim an optional value and fall back to `default` when blank.
pub fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}
