use std::sync::Arc;

use crate::application::detail_cache::DetailCacheService;
use crate::application::repos::Health;
use crate::application::search_cache::SearchCacheService;
use crate::application::upstream::RecipeApi;

#[derive(Clone)]
pub struct ApiState {
    pub search: Arc<SearchCacheService>,
    pub details: Arc<DetailCacheService>,
    pub upstream: Arc<dyn RecipeApi>,
    pub health: Arc<dyn Health>,
}
