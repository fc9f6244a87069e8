//! HTTP surface.

mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/recipes/search", get(handlers::search_recipes))
        .route("/api/recipes/details", get(handlers::recipe_details))
        .route(
            "/api/ingredients/autocomplete",
            get(handlers::autocomplete_ingredients),
        )
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
