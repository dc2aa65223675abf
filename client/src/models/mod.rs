//! Data structures exchanged with the RecipeHub backend.
//!
//! All request and response bodies use camelCase field names on the wire.

mod auth;
mod recipe;

pub use auth::*;
pub use recipe::*;
