//! Repository for the `creators` table.
//!
//! [`CreatorRepo::resolve_or_create`] is the only place creators come into
//! existence; every entry point that receives a legacy creator ID goes
//! through it.

use sqlx::{PgConnection, PgPool};
use seekreap_core::appeal::DEFAULT_APPEAL_CREDITS;
use seekreap_core::types::DbId;

use crate::models::creator::Creator;

/// Column list for `creators` queries.
const COLUMNS: &str = "id, legacy_id, display_name, appeal_credits, created_at, updated_at";

/// Provides lookup, lazy creation and credit accounting for creators.
pub struct CreatorRepo;

impl CreatorRepo {
    /// Find the creator with `legacy_id`, creating it with the default
    /// credit grant when absent.
    pub async fn resolve_or_create(pool: &PgPool, legacy_id: &str) -> Result<Creator, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::resolve_or_create_on(&mut conn, legacy_id).await
    }

    /// Same as [`Self::resolve_or_create`] on an existing connection or
    /// transaction.
    ///
    /// `ON CONFLICT DO NOTHING` waits for a concurrent insert of the same
    /// legacy ID to settle, so the follow-up SELECT always finds the row.
    pub async fn resolve_or_create_on(
        conn: &mut PgConnection,
        legacy_id: &str,
    ) -> Result<Creator, sqlx::Error> {
        let insert = format!(
            "INSERT INTO creators (legacy_id, appeal_credits) VALUES ($1, $2) \
             ON CONFLICT (legacy_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Creator>(&insert)
            .bind(legacy_id)
            .bind(DEFAULT_APPEAL_CREDITS)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(creator) = inserted {
            tracing::info!(creator_id = creator.id, legacy_id, "Creator created");
            return Ok(creator);
        }

        let select = format!("SELECT {COLUMNS} FROM creators WHERE legacy_id = $1");
        sqlx::query_as::<_, Creator>(&select)
            .bind(legacy_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a creator by legacy ID without creating one.
    pub async fn find_by_legacy_id(
        pool: &PgPool,
        legacy_id: &str,
    ) -> Result<Option<Creator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creators WHERE legacy_id = $1");
        sqlx::query_as::<_, Creator>(&query)
            .bind(legacy_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a creator by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Creator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creators WHERE id = $1");
        sqlx::query_as::<_, Creator>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Take one appeal credit if any remain.
    ///
    /// The conditional UPDATE holds the row lock, so concurrent appeals from
    /// the same creator cannot drive the balance negative. Returns the new
    /// balance, or `None` when no credit was available.
    pub async fn consume_appeal_credit(
        conn: &mut PgConnection,
        creator_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE creators SET appeal_credits = appeal_credits - 1 \
             WHERE id = $1 AND appeal_credits > 0 \
             RETURNING appeal_credits",
        )
        .bind(creator_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Overwrite the credit balance (periodic replenishment is driven from
    /// outside this service).
    pub async fn set_appeal_credits(
        pool: &PgPool,
        creator_id: DbId,
        credits: i32,
    ) -> Result<Option<Creator>, sqlx::Error> {
        let query = format!(
            "UPDATE creators SET appeal_credits = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Creator>(&query)
            .bind(creator_id)
            .bind(credits)
            .fetch_optional(pool)
            .await
    }

    /// Record the creator's channel display name.
    pub async fn set_display_name(
        conn: &mut PgConnection,
        creator_id: DbId,
        display_name: &str,
    ) -> Result<Option<Creator>, sqlx::Error> {
        let query = format!(
            "UPDATE creators SET display_name = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Creator>(&query)
            .bind(creator_id)
            .bind(display_name)
            .fetch_optional(&mut *conn)
            .await
    }
}
