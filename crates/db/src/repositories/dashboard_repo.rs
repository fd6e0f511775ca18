//! Per-creator aggregate counts.

use sqlx::PgPool;

use crate::models::dashboard::CreatorDashboard;

/// Read-only aggregations across a creator's jobs and appeals.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Dashboard counters for a creator.
    ///
    /// A creator that has never been seen gets zero counts and the default
    /// credit balance. No creator row is created.
    pub async fn creator_dashboard(
        pool: &PgPool,
        legacy_creator_id: &str,
    ) -> Result<CreatorDashboard, sqlx::Error> {
        let row = sqlx::query_as::<_, CreatorDashboard>(
            "SELECT c.legacy_id AS legacy_creator_id, \
                 (SELECT COUNT(*) FROM jobs j WHERE j.creator_id = c.id) AS total_submissions, \
                 (SELECT COUNT(*) FROM jobs j \
                     WHERE j.creator_id = c.id AND j.job_type = 'pre_flag') AS total_prechecks, \
                 (SELECT COUNT(*) FROM enforcement_actions ea \
                     WHERE ea.creator_id = c.id) AS total_enforcements, \
                 (SELECT COUNT(*) FROM appeals a WHERE a.creator_id = c.id) AS total_appeals, \
                 (SELECT COUNT(*) FROM appeals a \
                     WHERE a.creator_id = c.id \
                       AND a.status IN ('submitted', 'under_review')) AS open_appeals, \
                 (SELECT COUNT(*) FROM appeals a \
                     WHERE a.creator_id = c.id AND a.status = 'overturned') AS successful_appeals, \
                 c.appeal_credits \
             FROM creators c \
             WHERE c.legacy_id = $1",
        )
        .bind(legacy_creator_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.unwrap_or_else(|| CreatorDashboard::empty(legacy_creator_id)))
    }
}
