//! Client configuration.
//!
//! Settings are layered: built-in defaults, then
//! `<config dir>/recipehub/config.toml`, then `RECIPEHUB_*` environment
//! variables (e.g. `RECIPEHUB_API_URL`).

use std::{path::PathBuf, time::Duration};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::session::STORAGE_KEY;

pub const ENV_PREFIX: &str = "RECIPEHUB_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL prefixed to relative request paths.
    pub api_url: String,
    /// Site serving the catalog search route (`/api/recipes`).
    pub catalog_url: String,
    /// Where the session is persisted. Defaults to the platform data dir.
    pub storage_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api/v1".into(),
            catalog_url: "http://localhost:3001".into(),
            storage_path: None,
            timeout_secs: 30,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "recipehub", "recipehub")
}

impl ClientConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(dirs) = project_dirs() {
            figment = figment.merge(Toml::file(dirs.config_dir().join("config.toml")));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// The configured storage path, or `<data dir>/auth-storage.json`.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.storage_path.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().join(format!("{STORAGE_KEY}.json")))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
