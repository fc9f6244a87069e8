use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{RepoError, SearchCacheEntry, SearchCacheRepo};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct SearchCacheRow {
    ingredients: String,
    recipes: String,
    updated_at: OffsetDateTime,
}

impl From<SearchCacheRow> for SearchCacheEntry {
    fn from(row: SearchCacheRow) -> Self {
        Self {
            ingredients: row.ingredients,
            payload: row.recipes,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl SearchCacheRepo for PostgresRepositories {
    async fn find(&self, ingredients: &str) -> Result<Option<SearchCacheEntry>, RepoError> {
        let row = sqlx::query_as::<_, SearchCacheRow>(
            "SELECT ingredients, recipes, updated_at \
             FROM recipe_search_cache \
             WHERE ingredients = $1",
        )
        .bind(ingredients)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SearchCacheEntry::from))
    }

    async fn upsert(
        &self,
        ingredients: &str,
        payload: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO recipe_search_cache (ingredients, recipes, updated_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (ingredients) DO UPDATE SET \
                 recipes = EXCLUDED.recipes, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(ingredients)
        .bind(payload)
        .bind(updated_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn prune_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM recipe_search_cache WHERE updated_at < $1")
            .bind(cutoff)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
