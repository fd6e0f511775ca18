//! Submission job types and the job lifecycle state machine.
//!
//! Status values are stored as TEXT in the `jobs` table. The enums here are
//! the single source of truth for the accepted literals and for which
//! transitions the store may apply.

use crate::error::CoreError;

/// Declare a TEXT-backed enum with `as_str`, `parse`, `ALL` and serde
/// support. Variant literals are given explicitly so they stay stable
/// regardless of Rust naming.
#[macro_export]
macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The literal stored in the database and used on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse a stored or user-supplied literal.
            pub fn parse(value: &str) -> Result<Self, $crate::error::CoreError> {
                match value {
                    $( $val => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        $label,
                        [$($val),+].join(", ")
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_text_enum! {
    /// What kind of content a job analyses.
    JobType("job type") {
        Video = "video",
        Url = "url",
        PreFlag = "pre_flag",
        AppealPrep = "appeal_prep",
    }
}

define_text_enum! {
    /// Job lifecycle status.
    JobStatus("job status") {
        Pending = "pending",
        Processing = "processing",
        Completed = "completed",
        Failed = "failed",
        Archived = "archived",
    }
}

/// Maximum length of a job failure reason.
pub const MAX_FAILURE_REASON_LENGTH: usize = 2_000;

impl JobStatus {
    /// Statuses reachable in one step from `self`.
    pub fn successors(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Pending => &[JobStatus::Processing],
            JobStatus::Processing => &[JobStatus::Completed, JobStatus::Failed],
            JobStatus::Completed | JobStatus::Failed => &[JobStatus::Archived],
            JobStatus::Archived => &[],
        }
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        self.successors().contains(&next)
    }
}

/// Refuse any edge not present in [`JobStatus::successors`].
pub fn validate_job_transition(from: JobStatus, to: JobStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            entity: "Job",
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// A failure reason is required (non-blank) when entering `failed` and
/// forbidden for every other target status.
///
/// Returns the trimmed reason to persist.
pub fn validate_failure_reason(
    to: JobStatus,
    reason: Option<&str>,
) -> Result<Option<String>, CoreError> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());

    match (to, reason) {
        (JobStatus::Failed, Some(r)) if r.chars().count() > MAX_FAILURE_REASON_LENGTH => {
            Err(CoreError::Validation(format!(
                "failure_reason exceeds {MAX_FAILURE_REASON_LENGTH} characters"
            )))
        }
        (JobStatus::Failed, Some(r)) => Ok(Some(r.to_string())),
        (JobStatus::Failed, None) => Err(CoreError::Validation(
            "failure_reason is required when a job fails".to_string(),
        )),
        (_, Some(_)) => Err(CoreError::Validation(format!(
            "failure_reason is only allowed when status is '{}'",
            JobStatus::Failed
        ))),
        (_, None) => Ok(None),
    }
}

/// Which lifecycle timestamps a transition stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStamps {
    pub sets_started_at: bool,
    pub sets_completed_at: bool,
}

/// `started_at` is stamped once on `pending -> processing`; `completed_at`
/// once on entry into `completed` or `failed`.
pub fn transition_stamps(from: JobStatus, to: JobStatus) -> TransitionStamps {
    TransitionStamps {
        sets_started_at: from == JobStatus::Pending && to == JobStatus::Processing,
        sets_completed_at: matches!(to, JobStatus::Completed | JobStatus::Failed),
    }
}
