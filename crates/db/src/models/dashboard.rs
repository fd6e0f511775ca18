//! Creator dashboard aggregate.

use serde::Serialize;
use sqlx::FromRow;
use seekreap_core::appeal::DEFAULT_APPEAL_CREDITS;

/// Per-creator counters shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CreatorDashboard {
    pub legacy_creator_id: String,
    pub total_submissions: i64,
    pub total_prechecks: i64,
    pub total_enforcements: i64,
    pub total_appeals: i64,
    pub open_appeals: i64,
    pub successful_appeals: i64,
    pub appeal_credits: i32,
}

impl CreatorDashboard {
    /// Dashboard for a creator the store has never seen.
    pub fn empty(legacy_creator_id: &str) -> Self {
        Self {
            legacy_creator_id: legacy_creator_id.to_string(),
            total_submissions: 0,
            total_prechecks: 0,
            total_enforcements: 0,
            total_appeals: 0,
            open_appeals: 0,
            successful_appeals: 0,
            appeal_credits: DEFAULT_APPEAL_CREDITS,
        }
    }
}
