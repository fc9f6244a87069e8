//! Contract for the third-party recipe API.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recipes::{IngredientSuggestion, RecipeDetail, SearchPage};

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The API credential is absent. Raised before any network call.
    #[error("recipe api credential is not configured")]
    MissingCredential,
    #[error("recipe api returned status {status}")]
    Status { status: u16 },
    #[error("recipe api transport failure: {0}")]
    Transport(String),
    #[error("failed to decode recipe api response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// Ranked search over recipes matching an ingredient set.
    async fn search(
        &self,
        ingredients: &[String],
        limit: u32,
    ) -> Result<SearchPage, UpstreamError>;

    /// Bulk detail fetch. Records come back in arbitrary order, each tagged
    /// with its own id; ids the upstream cannot resolve are missing from the
    /// result rather than an error.
    async fn details_bulk(&self, ids: &[String]) -> Result<Vec<RecipeDetail>, UpstreamError>;

    /// Ingredient-name completion for a typed prefix. Never cached.
    async fn autocomplete(&self, query: &str) -> Result<Vec<IngredientSuggestion>, UpstreamError>;
}
