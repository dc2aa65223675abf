//! Authenticated JSON client for the RecipeHub backend.
//!
//! [`ApiClient::request`] attaches the session's bearer token, and recovers
//! from an expired access token by refreshing it once and retrying. Concurrent
//! requests that hit a 401 at the same time share a single refresh.

mod client;
mod options;
mod refresh;

use serde::Deserialize;

pub use client::{ApiClient, MAX_AUTH_RETRIES};
pub use options::RequestOptions;
pub use refresh::{RefreshFailure, REFRESH_PATH};

/// Response type for endpoints that return nothing useful.
///
/// Empty bodies decode to an empty JSON object, which this type accepts, as
/// it does any other object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Empty {}
