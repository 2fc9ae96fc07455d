//! Builds a ready [`TermResolver`] from the options a host pipeline passes to
//! its field processor.
//!
//! Options are validated eagerly when the factory is created so a pipeline
//! with a bad configuration fails at setup rather than halfway through an
//! indexing run.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    configuration::{ConfigError, RoleMapping},
    loader::{LoadError, OntologyLoader},
    registry::OntologyRegistry,
    resolver::TermResolver,
    source::{FetchSettings, OntologySource},
};

pub const ONTOLOGY_URI_PARAM: &str = "ontologyURI";
pub const CONFIG_FILE_PARAM: &str = "configurationFile";
pub const OLS_PREFIX_PARAM: &str = "OLSprefix";

/// Options recognised by the factory, named as the host pipeline names them.
///
/// Blank values count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperOptions {
    #[serde(rename = "ontologyURI", default, skip_serializing_if = "Option::is_none")]
    ontology_uri: Option<String>,
    #[serde(
        rename = "configurationFile",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    configuration_file: Option<PathBuf>,
    #[serde(rename = "OLSprefix", default, skip_serializing_if = "Option::is_none")]
    ols_prefix: Option<String>,
}

impl HelperOptions {
    /// Picks the recognised options out of a parameter list; other keys are
    /// ignored.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = Self::default();
        for (key, value) in params {
            match key.as_ref() {
                ONTOLOGY_URI_PARAM => options = options.with_ontology_uri(value),
                CONFIG_FILE_PARAM => options = options.with_configuration_file(value.into()),
                OLS_PREFIX_PARAM => options = options.with_ols_prefix(value),
                _ => {}
            }
        }
        options
    }

    #[must_use]
    pub fn with_ontology_uri(mut self, uri: impl Into<String>) -> Self {
        self.ontology_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_configuration_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.configuration_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_ols_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ols_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn ontology_uri(&self) -> Option<&str> {
        non_blank(self.ontology_uri.as_deref())
    }

    #[must_use]
    pub fn configuration_file(&self) -> Option<&Path> {
        self.configuration_file
            .as_deref()
            .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
    }

    #[must_use]
    pub fn ols_prefix(&self) -> Option<&str> {
        non_blank(self.ols_prefix.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Rejected option sets, reported before any ontology is loaded.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no such config file `{path}`")]
    MissingConfigFile { path: PathBuf },
    #[error("no ontology URI or OLS prefix set - need one or the other")]
    MissingSource,
    #[error(
        "config file `{path}` names no ontology: set `ontology_uri` or `ols_prefix` in it, or \
         pass `ontologyURI` or `OLSprefix`"
    )]
    MissingSourceInConfigFile { path: PathBuf },
    #[error("unusable config file: {0}")]
    InvalidConfigFile(#[source] ConfigError),
}

/// Failures while building a resolver from valid options.
#[derive(Debug, Error)]
pub enum HelperBuildError {
    /// The role mapping file could not be read.
    #[error("could not build ontology helper: {0}")]
    Config(#[source] ConfigError),
    /// The ontology locator or a mapped property is not a valid URI.
    #[error("could not build ontology helper: {0}")]
    InvalidUri(#[source] LoadError),
    /// The ontology could not be fetched or parsed.
    #[error("could not build ontology helper: {0}")]
    Ontology(#[source] LoadError),
    /// No build path applies to the options.
    #[error("could not build ontology helper: {reason}")]
    NoHelper { reason: String },
}

/// Validates host options and builds [`TermResolver`]s from them.
#[derive(Debug)]
pub struct OntologyHelperFactory {
    options: HelperOptions,
    file_mapping: Option<RoleMapping>,
    loader: OntologyLoader,
}

impl OntologyHelperFactory {
    /// Creates a factory, validating `options` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the configuration file is missing,
    /// or when no ontology source is given either as an option or inside the
    /// configuration file.
    pub fn new(options: HelperOptions) -> Result<Self, ConfigurationError> {
        let file_mapping = Self::validate_parameters(&options)?;
        Ok(Self {
            options,
            file_mapping,
            loader: OntologyLoader::default(),
        })
    }

    /// Checks the option set, reading the configuration file when it is the
    /// only place an ontology source could come from.
    fn validate_parameters(
        options: &HelperOptions,
    ) -> Result<Option<RoleMapping>, ConfigurationError> {
        let has_source = options.ontology_uri().is_some() || options.ols_prefix().is_some();

        let Some(path) = options.configuration_file() else {
            return if has_source {
                Ok(None)
            } else {
                Err(ConfigurationError::MissingSource)
            };
        };

        if !path.is_file() {
            return Err(ConfigurationError::MissingConfigFile {
                path: path.to_path_buf(),
            });
        }
        if has_source {
            return Ok(None);
        }

        let mapping = RoleMapping::from_properties_file(path)
            .map_err(ConfigurationError::InvalidConfigFile)?;
        if mapping.ontology_uri().is_none() && mapping.ols_prefix().is_none() {
            return Err(ConfigurationError::MissingSourceInConfigFile {
                path: path.to_path_buf(),
            });
        }
        Ok(Some(mapping))
    }

    /// Attaches the registry used to resolve `OLSprefix`.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn OntologyRegistry>) -> Self {
        self.loader = self.loader.with_registry(registry);
        self
    }

    #[must_use]
    pub fn with_fetch_settings(mut self, settings: FetchSettings) -> Self {
        self.loader = self.loader.with_settings(settings);
        self
    }

    #[must_use]
    pub fn options(&self) -> &HelperOptions {
        &self.options
    }

    /// Loads the ontology and returns a resolver over it.
    ///
    /// `ontologyURI` takes priority over `OLSprefix`; either may come from the
    /// options or, failing that, from the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`HelperBuildError`] carrying the underlying cause when the
    /// configuration file, the locator or the ontology itself is unusable,
    /// or when the registry cannot resolve the prefix.
    pub async fn build_helper(&self) -> Result<TermResolver, HelperBuildError> {
        let mapping = self.role_mapping()?;

        let ontology_uri = self
            .options
            .ontology_uri()
            .or_else(|| mapping.ontology_uri())
            .map(str::to_string);
        let ols_prefix = self
            .options
            .ols_prefix()
            .or_else(|| mapping.ols_prefix())
            .map(str::to_string);

        if let Some(uri) = ontology_uri {
            let source = OntologySource::DirectUri(uri);
            return self.build_from_source(&source, mapping).await;
        }

        if let Some(prefix) = ols_prefix {
            let source = OntologySource::NamedPrefix(prefix.clone());
            return match self.build_from_source(&source, mapping).await {
                Err(HelperBuildError::Ontology(
                    err @ (LoadError::NoRegistry { .. } | LoadError::UnknownPrefix { .. }),
                )) => {
                    tracing::error!(prefix = %prefix, err.msg = %err, "ontology_registry_unresolved");
                    Err(HelperBuildError::NoHelper {
                        reason: err.to_string(),
                    })
                }
                other => other,
            };
        }

        Err(HelperBuildError::NoHelper {
            reason: "no ontology URI or OLS prefix available".to_string(),
        })
    }

    fn role_mapping(&self) -> Result<RoleMapping, HelperBuildError> {
        if let Some(mapping) = &self.file_mapping {
            return Ok(mapping.clone());
        }
        match self.options.configuration_file() {
            Some(path) => RoleMapping::from_properties_file(path).map_err(|err| {
                tracing::error!(
                    path = %path.display(),
                    err.msg = %err,
                    err.detail = ?err,
                    "ontology_config_read_error"
                );
                HelperBuildError::Config(err)
            }),
            None => Ok(RoleMapping::default_configuration()),
        }
    }

    async fn build_from_source(
        &self,
        source: &OntologySource,
        mapping: RoleMapping,
    ) -> Result<TermResolver, HelperBuildError> {
        let ontology = self.loader.load(source, &mapping).await.map_err(|err| {
            if matches!(
                err,
                LoadError::InvalidLocator { .. } | LoadError::InvalidPropertyUri(_)
            ) {
                tracing::error!(source = %source, err.msg = %err, "ontology_uri_error");
                HelperBuildError::InvalidUri(err)
            } else {
                tracing::error!(
                    source = %source,
                    err.msg = %err,
                    err.detail = ?err,
                    "ontology_load_error"
                );
                HelperBuildError::Ontology(err)
            }
        })?;

        let resolver = TermResolver::new(ontology, mapping)
            .map_err(|err| HelperBuildError::InvalidUri(LoadError::InvalidPropertyUri(err)))?;
        tracing::info!(
            source = %source,
            triples = resolver.ontology().len(),
            "ontology_helper_built"
        );
        Ok(resolver)
    }
}

/// Validates `options` and builds a resolver in one step.
///
/// # Errors
///
/// Returns [`crate::Error::Configuration`] for rejected options and
/// [`crate::Error::HelperBuild`] when the resolver cannot be built.
pub async fn build_helper(options: HelperOptions) -> crate::Result<TermResolver> {
    let factory = OntologyHelperFactory::new(options)?;
    Ok(factory.build_helper().await?)
}
