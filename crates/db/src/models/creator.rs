//! Creator entity (a content producer that submits jobs and appeals).

use serde::Serialize;
use sqlx::FromRow;
use seekreap_core::types::{DbId, Timestamp};

/// A row from the `creators` table.
///
/// `legacy_id` is the identifier older clients send as `creator_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Creator {
    pub id: DbId,
    pub legacy_id: String,
    pub display_name: Option<String>,
    pub appeal_credits: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
