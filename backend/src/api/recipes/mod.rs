//! Module for the recipe catalog API.

pub mod handlers;
pub mod routes;
