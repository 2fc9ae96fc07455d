//! Crate-level error type.
//!
//! Each module keeps its own error enum; this aggregate lets callers that
//! drive several of them (settings, factory, resolver) use a single `?`.

use std::path::PathBuf;

use crate::ontology::{ConfigurationError, HelperBuildError, ResolveError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    HelperBuild(#[from] HelperBuildError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("cannot read settings file `{path}`: {source}")]
    SettingsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
