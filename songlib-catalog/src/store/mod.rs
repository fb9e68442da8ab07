//! Catalog persistence
//!
//! Every operation is one unit of work: a liveness check of the connection,
//! then `BEGIN`, the work, and `COMMIT`. Any failure rolls the unit back and
//! leaves prior state unchanged. The store is the sole owner of durable state.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::Predicate;
use crate::models::{Song, SongPatch};

pub mod sqlite;

pub use sqlite::SqliteCatalogStore;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("song {0} not found")]
    NotFound(Uuid),

    /// Uniqueness violation (duplicate `link`)
    #[error("uniqueness conflict: {0}")]
    Conflict(String),

    /// Liveness check failed before the unit of work began
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Stored row could not be turned back into a song
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let unique_violation = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());

        if unique_violation {
            StoreError::Conflict(err.to_string())
        } else {
            StoreError::Database(err)
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract consumed by the catalog service
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a new song
    async fn insert(&self, song: &Song) -> StoreResult<()>;

    /// Fetch, merge `patch` over the stored record, write it back
    ///
    /// Returns the merged record. Fails `NotFound` when `id` is absent.
    async fn update(&self, id: Uuid, patch: SongPatch) -> StoreResult<Song>;

    /// Confirm existence, then delete
    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Songs matching every predicate, bounded by `limit` and `offset`
    async fn list(
        &self,
        predicates: &[Predicate],
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Song>>;

    /// Full lyric text of one song
    async fn text(&self, id: Uuid) -> StoreResult<String>;
}
