use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{DetailCacheEntry, DetailCacheRepo, RepoError};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct DetailCacheRow {
    id: String,
    data: String,
    updated_at: OffsetDateTime,
}

impl From<DetailCacheRow> for DetailCacheEntry {
    fn from(row: DetailCacheRow) -> Self {
        Self {
            id: row.id,
            payload: row.data,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DetailCacheRepo for PostgresRepositories {
    async fn find_many(&self, ids: &[String]) -> Result<Vec<DetailCacheEntry>, RepoError> {
        let rows = sqlx::query_as::<_, DetailCacheRow>(
            "SELECT id, data, updated_at \
             FROM recipe_detail_cache \
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DetailCacheEntry::from).collect())
    }

    async fn upsert(
        &self,
        id: &str,
        payload: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO recipe_detail_cache (id, data, updated_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET \
                 data = EXCLUDED.data, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(id)
        .bind(payload)
        .bind(updated_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn prune_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM recipe_detail_cache WHERE updated_at < $1")
            .bind(cutoff)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
