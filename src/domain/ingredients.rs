use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngredientKeyError {
    #[error("ingredient list is empty")]
    Empty,
}

/// Normalized ingredient-set lookup key.
///
/// Two searches for the same ingredients in a different order or casing must
/// land on the same cache row, so the key is the trimmed, lowercased, sorted,
/// deduplicated join of the ingredient names. An input that normalizes to
/// nothing is a caller error and never reaches the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngredientKey {
    key: String,
    ingredients: Vec<String>,
}

impl IngredientKey {
    pub fn new<I, S>(ingredients: I) -> Result<Self, IngredientKeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = ingredients
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        cleaned.sort();
        cleaned.dedup();

        if cleaned.is_empty() {
            return Err(IngredientKeyError::Empty);
        }

        let key = cleaned.join(",");
        Ok(Self {
            key,
            ingredients: cleaned,
        })
    }

    /// Parse a comma-separated ingredient list as received on the wire.
    pub fn parse(raw: &str) -> Result<Self, IngredientKeyError> {
        Self::new(raw.split(','))
    }

    /// The store lookup key.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The normalized ingredient names, in key order.
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }
}

impl fmt::Display for IngredientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
