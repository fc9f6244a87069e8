//! HTTP client for the Spoonacular recipe API.

use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::application::upstream::{RecipeApi, UpstreamError};
use crate::config::UpstreamSettings;
use crate::domain::recipes::{IngredientSuggestion, RecipeDetail, SearchPage};
use crate::infra::error::InfraError;

// The upstream caps autocomplete responses anyway; callers only show a short
// list.
const AUTOCOMPLETE_LIMIT: u32 = 10;

pub struct SpoonacularClient {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl SpoonacularClient {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build upstream http client: {err}"))
            })?;

        Ok(Self {
            client,
            base: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("larder/", env!("CARGO_PKG_VERSION"))
    }

    /// The credential check happens before any URL or request is built, so a
    /// misconfigured deployment never reaches the network.
    fn key(&self) -> Result<&str, UpstreamError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(UpstreamError::MissingCredential)
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        op: &'static str,
    ) -> Result<T, UpstreamError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        histogram!("larder_upstream_request_ms", "op" => op)
            .record(started.elapsed().as_millis() as f64);

        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| UpstreamError::Decode(err.to_string()))
    }
}

#[async_trait]
impl RecipeApi for SpoonacularClient {
    async fn search(
        &self,
        ingredients: &[String],
        limit: u32,
    ) -> Result<SearchPage, UpstreamError> {
        let key = self.key()?;
        let joined = ingredients.join(",");
        let number = limit.to_string();
        let url = self.endpoint(
            "recipes/complexSearch",
            &[
                ("includeIngredients", joined.as_str()),
                ("number", number.as_str()),
                ("instructionsRequired", "true"),
                ("addRecipeInformation", "true"),
                ("sort", "max-used-ingredients"),
                ("apiKey", key),
            ],
        )?;

        debug!(
            target = "infra::spoonacular",
            ingredients = %joined,
            "upstream complex search"
        );
        self.get_json(url, "search").await
    }

    async fn details_bulk(&self, ids: &[String]) -> Result<Vec<RecipeDetail>, UpstreamError> {
        let key = self.key()?;
        let joined = ids.join(",");
        let url = self.endpoint(
            "recipes/informationBulk",
            &[
                ("ids", joined.as_str()),
                ("includeNutrition", "false"),
                ("apiKey", key),
            ],
        )?;

        debug!(
            target = "infra::spoonacular",
            ids = %joined,
            "upstream bulk information"
        );
        self.get_json(url, "details_bulk").await
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<IngredientSuggestion>, UpstreamError> {
        let key = self.key()?;
        let number = AUTOCOMPLETE_LIMIT.to_string();
        let url = self.endpoint(
            "food/ingredients/autocomplete",
            &[
                ("query", query),
                ("number", number.as_str()),
                ("apiKey", key),
            ],
        )?;

        self.get_json(url, "autocomplete").await
    }
}
