//! Store contracts for the two cache shapes.
//!
//! The durable store is the only shared mutable state in the service. Each
//! trait covers one table; rows carry the serialized payload and the
//! timestamp of the last successful refresh, nothing else.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// One row of the set-query (search) cache.
#[derive(Debug, Clone)]
pub struct SearchCacheEntry {
    pub ingredients: String,
    pub payload: String,
    pub updated_at: OffsetDateTime,
}

/// One row of the bulk-identifier (detail) cache.
#[derive(Debug, Clone)]
pub struct DetailCacheEntry {
    pub id: String,
    pub payload: String,
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait SearchCacheRepo: Send + Sync {
    async fn find(&self, ingredients: &str) -> Result<Option<SearchCacheEntry>, RepoError>;

    /// Create the row if absent, otherwise overwrite payload and timestamp.
    /// Atomic per row; concurrent writers race last-writer-wins.
    async fn upsert(
        &self,
        ingredients: &str,
        payload: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), RepoError>;

    /// Delete rows last refreshed before `cutoff`. Returns rows removed.
    async fn prune_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait DetailCacheRepo: Send + Sync {
    /// Fetch whichever of `ids` have rows; ids without a row are simply
    /// absent from the result.
    async fn find_many(&self, ids: &[String]) -> Result<Vec<DetailCacheEntry>, RepoError>;

    async fn upsert(
        &self,
        id: &str,
        payload: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), RepoError>;

    /// Delete rows last refreshed before `cutoff`. Returns rows removed.
    async fn prune_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, RepoError>;
}

/// Liveness probe for the backing store.
#[async_trait]
pub trait Health: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
