//! The entry point applications hold on to.

use tracing::warn;

use crate::{
    api::ApiClient,
    cache::RecipeCache,
    config::ClientConfig,
    errors::ClientError,
    services::{AuthService, RecipeService, UserService},
    session::{FileStorage, MemoryStorage, SessionStore},
};

/// Owns the API client, session and recipe cache, and hands out services
/// that borrow them.
#[derive(Clone)]
pub struct RecipeHub {
    api: ApiClient,
    cache: RecipeCache,
    catalog_url: String,
}

impl RecipeHub {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(config, session)?,
            cache: RecipeCache::new(),
            catalog_url: config.catalog_url.clone(),
        })
    }

    /// Restores the session from the configured storage file, or keeps it in
    /// memory when no location can be determined.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let session = match config.session_path() {
            Some(path) => SessionStore::new(FileStorage::new(path)),
            None => {
                warn!("no storage location available, session will not be persisted");
                SessionStore::new(MemoryStorage::new())
            }
        };
        Self::new(config, session)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    pub fn cache(&self) -> &RecipeCache {
        &self.cache
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.api, &self.cache)
    }

    pub fn recipes(&self) -> RecipeService<'_> {
        RecipeService::new(&self.api, &self.cache, &self.catalog_url)
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.api, &self.cache)
    }
}
