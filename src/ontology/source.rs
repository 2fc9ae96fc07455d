use std::{fmt, time::Duration};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Where an ontology is read from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OntologySource {
    /// URL or filesystem path of an ontology document.
    DirectUri(String),
    /// Identifier resolved by an [`OntologyRegistry`](super::OntologyRegistry).
    NamedPrefix(String),
}

/// Errors raised when constructing an [`OntologySource`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("ontology URI must not be blank")]
    BlankUri,
    #[error("ontology registry prefix must not be blank")]
    BlankPrefix,
    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,
}

impl OntologySource {
    /// Builds a direct source, trimming the locator.
    ///
    /// # Errors
    ///
    /// Fails when `uri` is blank.
    pub fn direct(uri: impl AsRef<str>) -> Result<Self, SourceError> {
        let uri = uri.as_ref().trim();
        if uri.is_empty() {
            return Err(SourceError::BlankUri);
        }
        Ok(Self::DirectUri(uri.to_string()))
    }

    /// Builds a registry-backed source, trimming the prefix.
    ///
    /// # Errors
    ///
    /// Fails when `prefix` is blank.
    pub fn named(prefix: impl AsRef<str>) -> Result<Self, SourceError> {
        let prefix = prefix.as_ref().trim();
        if prefix.is_empty() {
            return Err(SourceError::BlankPrefix);
        }
        Ok(Self::NamedPrefix(prefix.to_string()))
    }
}

impl fmt::Display for OntologySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectUri(uri) => f.write_str(uri),
            Self::NamedPrefix(prefix) => write!(f, "registry:{prefix}"),
        }
    }
}

/// Limits applied while fetching ontology documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Deadline for a whole load (registry lookup, connect and transfer), in
    /// milliseconds. Never zero.
    #[serde(
        default = "default_timeout_ms",
        deserialize_with = "deserialize_timeout_ms"
    )]
    timeout_ms: u64,
    /// User agent sent with HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_user_agent() -> String {
    format!("ontology-terms/{}", crate::VERSION)
}

fn deserialize_timeout_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match u64::deserialize(deserializer)? {
        0 => Err(serde::de::Error::custom(SourceError::ZeroTimeout)),
        millis => Ok(millis),
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchSettings {
    /// Sets the load deadline. Sub-millisecond values round up to 1ms.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ZeroTimeout`] for a zero `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, SourceError> {
        if timeout.is_zero() {
            return Err(SourceError::ZeroTimeout);
        }
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.timeout_ms = millis.max(1);
        Ok(self)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
