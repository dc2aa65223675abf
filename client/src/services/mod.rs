//! Module for the endpoint-level operations of the RecipeHub API.
//!
//! Each service borrows the shared [`ApiClient`](crate::api::ApiClient) and,
//! where an operation changes who is logged in or what they own, updates the
//! session store and the recipe cache accordingly.

pub mod auth;
pub mod recipes;
pub mod users;

pub use auth::AuthService;
pub use recipes::RecipeService;
pub use users::{PublicProfile, UserService};
