//! Wire and cache payload schema for recipe data.
//!
//! These mirror the upstream API's JSON shapes (camelCase field names,
//! plenty of optional metadata). Cached payloads are serialized from and
//! deserialized into these structs rather than stored as untyped blobs, so a
//! schema drift shows up as a decode error instead of bad data reaching a
//! caller. Unknown upstream fields are ignored.

use serde::{Deserialize, Serialize};

/// One entry of an ingredient-search result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
}

/// A search-result page as returned by the upstream complex search,
/// pagination metadata included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<RecipeSummary>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// Full detail record for a single recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl RecipeDetail {
    /// String form of the externally-assigned id, as used for cache rows.
    pub fn cache_id(&self) -> String {
        self.id.to_string()
    }
}

/// Ingredient-name completion for a typed prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientSuggestion {
    pub id: i64,
    pub name: String,
}
