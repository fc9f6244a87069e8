//! Recipe retrieval handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::domain::ingredients::IngredientKey;

use super::error::ApiError;
use super::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub ingredients: Option<String>,
}

pub async fn search_recipes(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = query.ingredients.unwrap_or_default();
    let key = IngredientKey::parse(&raw)
        .map_err(|_| ApiError::bad_request("ingredients parameter is required", None))?;

    let page = state
        .search
        .lookup(&key)
        .await
        .map_err(ApiError::from_retrieval)?;

    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub ids: Option<String>,
}

pub async fn recipe_details(
    State(state): State<ApiState>,
    Query(query): Query<DetailsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = query.ids.unwrap_or_default();
    let ids = parse_ids(&raw)?;

    let details = state
        .details
        .lookup_many(&ids)
        .await
        .map_err(ApiError::from_retrieval)?;

    Ok(Json(details))
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub query: Option<String>,
}

pub async fn autocomplete_ingredients(
    State(state): State<ApiState>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = query.query.unwrap_or_default();
    let prefix = raw.trim();
    if prefix.is_empty() {
        return Err(ApiError::bad_request("query parameter is required", None));
    }

    let suggestions = state
        .upstream
        .autocomplete(prefix)
        .await
        .map_err(|err| ApiError::from_retrieval(err.into()))?;

    Ok(Json(suggestions))
}

pub async fn healthz(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    state.health.ping().await.map_err(|err| {
        tracing::warn!(
            target = "infra::http::api",
            error = %err,
            "health check failed"
        );
        ApiError::unavailable()
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recipe ids are the string form of upstream-assigned integers; anything
/// else can never resolve, so it is rejected here rather than forwarded.
fn parse_ids(raw: &str) -> Result<Vec<String>, ApiError> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let id = part.trim();
        if id.is_empty() {
            continue;
        }
        if !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ApiError::bad_request(
                "ids must be numeric recipe identifiers",
                Some(format!("`{id}` is not a recipe id")),
            ));
        }
        ids.push(id.to_string());
    }

    if ids.is_empty() {
        return Err(ApiError::bad_request("ids parameter is required", None));
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_trimmed_and_empty_segments_dropped() {
        let ids = parse_ids(" 12345 , ,67 ").expect("ids");
        assert_eq!(ids, ["12345", "67"]);
    }

    #[test]
    fn blank_id_list_is_rejected() {
        assert!(parse_ids("").is_err());
        assert!(parse_ids(" , ").is_err());
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert!(parse_ids("12,abc").is_err());
        assert!(parse_ids("12.5").is_err());
        assert!(parse_ids("-3").is_err());
    }
}
