//! Outcome of notifying the external processing tier about a new job.
//!
//! Forwarding is best-effort. The outcome is persisted on the job so that
//! reconciliation can find jobs the tier never heard about.

use serde::Serialize;

/// Stored literal for [`ForwardOutcome::NotAttempted`].
pub const FORWARD_NOT_ATTEMPTED: &str = "not_attempted";
/// Stored literal for [`ForwardOutcome::Forwarded`].
pub const FORWARD_FORWARDED: &str = "forwarded";
/// Stored literal for [`ForwardOutcome::Unreachable`].
pub const FORWARD_UNREACHABLE: &str = "unreachable";
/// Stored literal for [`ForwardOutcome::Rejected`].
pub const FORWARD_REJECTED: &str = "rejected";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForwardOutcome {
    /// No processing tier is configured.
    NotAttempted,
    /// The tier accepted the job, optionally returning its own ID.
    Forwarded { correlation_id: Option<String> },
    /// Network error or timeout.
    Unreachable { reason: String },
    /// The tier answered with a non-2xx status.
    Rejected { reason: String },
}

impl ForwardOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            ForwardOutcome::NotAttempted => FORWARD_NOT_ATTEMPTED,
            ForwardOutcome::Forwarded { .. } => FORWARD_FORWARDED,
            ForwardOutcome::Unreachable { .. } => FORWARD_UNREACHABLE,
            ForwardOutcome::Rejected { .. } => FORWARD_REJECTED,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            ForwardOutcome::Forwarded { correlation_id } => correlation_id.as_deref(),
            _ => None,
        }
    }

    /// Failure reason for unreachable/rejected outcomes.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ForwardOutcome::Unreachable { reason } | ForwardOutcome::Rejected { reason } => {
                Some(reason)
            }
            _ => None,
        }
    }
}

/// Pull a correlation ID out of the tier's response body.
///
/// Accepts `correlation_id`, `job_id` or `id`, as a string or a number.
pub fn extract_correlation_id(body: &serde_json::Value) -> Option<String> {
    ["correlation_id", "job_id", "id"]
        .iter()
        .filter_map(|key| body.get(key))
        .find_map(|value| match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
