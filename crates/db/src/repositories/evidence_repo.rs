//! Repository for the `appeal_evidence` table.

use sqlx::PgPool;
use seekreap_core::error::CoreError;
use seekreap_core::types::DbId;

use crate::error::RepoResult;
use crate::models::appeal::{AppealEvidence, CreateEvidence};

const COLUMNS: &str = "id, appeal_id, evidence_type, file_ref, original_filename, description, added_at";

/// Append-only evidence records attached to appeals.
pub struct EvidenceRepo;

impl EvidenceRepo {
    /// Attach evidence metadata to an existing appeal.
    ///
    /// The existence check and the insert are one statement, so evidence can
    /// never reference an appeal that does not exist.
    pub async fn create(
        pool: &PgPool,
        appeal_id: DbId,
        input: &CreateEvidence,
    ) -> RepoResult<AppealEvidence> {
        let query = format!(
            "INSERT INTO appeal_evidence \
                 (appeal_id, evidence_type, file_ref, original_filename, description) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE EXISTS (SELECT 1 FROM appeals WHERE id = $1) \
             RETURNING {COLUMNS}"
        );
        let evidence = sqlx::query_as::<_, AppealEvidence>(&query)
            .bind(appeal_id)
            .bind(&input.evidence_type)
            .bind(&input.file_ref)
            .bind(&input.original_filename)
            .bind(&input.description)
            .fetch_optional(pool)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Appeal",
                id: appeal_id,
            })?;

        tracing::info!(
            appeal_id,
            evidence_id = evidence.id,
            evidence_type = %evidence.evidence_type,
            "Evidence added"
        );
        Ok(evidence)
    }

    /// Evidence for an appeal, newest first.
    pub async fn list_for_appeal(
        pool: &PgPool,
        appeal_id: DbId,
    ) -> Result<Vec<AppealEvidence>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appeal_evidence \
             WHERE appeal_id = $1 \
             ORDER BY added_at DESC, id DESC"
        );
        sqlx::query_as::<_, AppealEvidence>(&query)
            .bind(appeal_id)
            .fetch_all(pool)
            .await
    }
}
