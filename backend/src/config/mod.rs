//! Central module for application-wide configuration settings.
//!
//! Settings are layered: built-in defaults, then `recipehub-backend.toml` in
//! the working directory, then `RECIPEHUB_BACKEND_*` environment variables
//! (e.g. `RECIPEHUB_BACKEND_BIND=0.0.0.0:8080`).

use std::{net::SocketAddr, path::PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const ENV_PREFIX: &str = "RECIPEHUB_BACKEND_";
pub const CONFIG_FILE: &str = "recipehub-backend.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub bind: SocketAddr,
    /// JSON array of recipes served by the catalog route.
    pub recipes_path: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3001)),
            recipes_path: PathBuf::from("data/recipes.json"),
        }
    }
}

impl BackendConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}
