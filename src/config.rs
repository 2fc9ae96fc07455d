//! YAML settings for binaries embedding the resolver.
//!
//! ```yaml
//! logger:
//!   level: debug
//!   format: json
//! fetch:
//!   timeout_ms: 30000
//! registry:
//!   efo: https://www.ebi.ac.uk/efo/efo.owl
//! helper:
//!   OLSprefix: efo
//!   configurationFile: conf/efo.properties
//! ```
//!
//! Every section is optional.

use std::{collections::BTreeMap, path::Path, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    errors::Error,
    logger::LoggerSettings,
    ontology::{
        ConfigurationError, FetchSettings, HelperOptions, OntologyHelperFactory, StaticRegistry,
    },
    Result,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logger: LoggerSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    /// Named-registry prefixes and the locators they stand for.
    #[serde(default)]
    pub registry: BTreeMap<String, String>,
    #[serde(default)]
    pub helper: HelperOptions,
}

impl Settings {
    /// Reads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingsIo`] when the file cannot be read and
    /// [`Error::Settings`] when it is not valid settings YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = content.parse()?;
        tracing::debug!(path = %path.display(), "settings_loaded");
        Ok(settings)
    }

    /// Registry built from the `registry` section.
    #[must_use]
    pub fn static_registry(&self) -> StaticRegistry {
        StaticRegistry::new(self.registry.clone())
    }

    /// Factory for `options`, wired with this file's fetch limits and
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when `options` are rejected.
    pub fn helper_factory(
        &self,
        options: HelperOptions,
    ) -> std::result::Result<OntologyHelperFactory, ConfigurationError> {
        let factory =
            OntologyHelperFactory::new(options)?.with_fetch_settings(self.fetch.clone());
        let registry = self.static_registry();
        Ok(if registry.is_empty() {
            factory
        } else {
            factory.with_registry(Arc::new(registry))
        })
    }
}

impl FromStr for Settings {
    type Err = Error;

    fn from_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Settings;
    use crate::{
        errors::Error,
        logger::{Format, LogLevel},
    };

    #[test]
    fn empty_document_gives_defaults() {
        let settings: Settings = "".parse().expect("empty settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.fetch.timeout(), Duration::from_secs(60));
        assert!(settings.logger.enable);
    }

    #[test]
    fn sections_are_read() {
        let settings: Settings = r"
logger:
  level: debug
  format: pretty
fetch:
  timeout_ms: 5000
registry:
  EFO: https://www.ebi.ac.uk/efo/efo.owl
helper:
  OLSprefix: efo
"
        .parse()
        .expect("valid settings");

        assert_eq!(settings.logger.level, LogLevel::Debug);
        assert_eq!(settings.logger.format, Format::Pretty);
        assert_eq!(settings.fetch.timeout(), Duration::from_secs(5));
        assert!(settings.fetch.user_agent.starts_with("ontology-terms/"));
        assert_eq!(settings.helper.ols_prefix(), Some("efo"));
        assert!(!settings.static_registry().is_empty());
    }

    #[test]
    fn zero_fetch_timeout_is_rejected() {
        let result = "fetch:\n  timeout_ms: 0\n".parse::<Settings>();
        assert!(matches!(result, Err(Error::Settings(_))), "{result:?}");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let result = "logger:\n  level: loud\n".parse::<Settings>();
        assert!(matches!(result, Err(Error::Settings(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::from_file("does/not/exist.yaml").expect_err("missing file");
        assert!(
            matches!(&err, Error::SettingsIo { path, .. } if path.ends_with("exist.yaml")),
            "{err:?}"
        );
    }
}
