//! Global application error types.
//!
//! Startup failures are reported through these and wrapped with context by
//! `main`; request handlers have no failure path of their own.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(#[from] pub figment::Error);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read recipe file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("recipe file {path} is not a JSON array of recipes: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
