//! Defines the HTTP routes for the recipe catalog.

use axum::{routing::get, Router};

use super::handlers::search_recipes;
use crate::api::AppState;

pub fn recipe_router() -> Router<AppState> {
    Router::new().route("/", get(search_recipes))
}
