//! Central module for organizing the application's API endpoints.
//!
//! [`router`] assembles the full application: the welcome and health routes,
//! the recipe catalog under `/api/recipes`, and the request logging layer.

pub mod recipes;

use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};

use crate::{middleware::log_requests, services::Catalog};

pub type AppState = Arc<Catalog>;

pub fn router(catalog: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/recipes", recipes::routes::recipe_router())
        .layer(from_fn(log_requests))
        .with_state(catalog)
}

async fn root_handler() -> &'static str {
    "Welcome to RecipeHub!"
}

async fn health_handler() -> &'static str {
    "ok"
}
