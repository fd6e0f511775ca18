//! Error type for repository operations that enforce domain rules.
//!
//! Plain CRUD methods return `sqlx::Error` directly. Methods that validate a
//! state machine or a quota inside a transaction return [`RepoError`] so the
//! caller can tell a refused operation from a store failure.

use seekreap_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
