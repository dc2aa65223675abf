//! Core `recipehub-client` crate for talking to the RecipeHub backend API.
//!
//! This crate owns the persisted login session, the authenticated HTTP client
//! (with coordinated token refresh on 401 responses), and thin services for the
//! auth, recipe and user endpoints built on top of it. [`RecipeHub`] ties the
//! pieces together for applications.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod hub;
pub mod models;
pub mod services;
pub mod session;
pub mod validation;

// Re-exports for convenience
pub use api::{ApiClient, Empty, RequestOptions};
pub use cache::RecipeCache;
pub use catalog::{RecipeQuery, TimeFilter};
pub use config::ClientConfig;
pub use errors::ClientError;
pub use hub::RecipeHub;
pub use models::*;
pub use session::{FileStorage, MemoryStorage, Session, SessionStorage, SessionStore};
pub use validation::{FieldError, ValidationErrors};
