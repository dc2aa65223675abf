//! Handler functions for the recipe catalog API.

use axum::{
    extract::{Query, State},
    Json,
};
use recipehub_client::{Recipe, RecipeQuery};
use tracing::debug;

use crate::api::AppState;

/// `GET /api/recipes?search=&time=&id=`
pub async fn search_recipes(
    State(catalog): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> Json<Vec<Recipe>> {
    let recipes = catalog.search(&query);
    debug!(?query, matches = recipes.len(), "catalog search");
    Json(recipes)
}
