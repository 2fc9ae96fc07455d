use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a registry backend.
#[derive(Debug, Error)]
#[error("ontology registry lookup for `{prefix}` failed: {message}")]
pub struct RegistryError {
    pub prefix: String,
    pub message: String,
}

/// Lookup service turning a named prefix (for example `efo`) into the locator
/// of the ontology document it stands for.
///
/// Implementors return `Ok(None)` when the prefix is unknown; errors are for
/// backend failures only.
#[async_trait]
pub trait OntologyRegistry: Send + Sync {
    async fn locate(&self, prefix: &str) -> Result<Option<String>, RegistryError>;
}

/// Registry backed by a fixed prefix table, typically read from settings.
#[derive(Clone, Debug, Default)]
pub struct StaticRegistry {
    entries: BTreeMap<String, String>,
}

impl StaticRegistry {
    #[must_use]
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(prefix, uri)| (prefix.trim().to_lowercase(), uri.trim().to_string()))
            .filter(|(prefix, uri)| !prefix.is_empty() && !uri.is_empty())
            .collect();
        Self { entries }
    }

    /// Adds or replaces a prefix.
    #[must_use]
    pub fn with_entry(mut self, prefix: impl AsRef<str>, uri: impl Into<String>) -> Self {
        self.entries
            .insert(prefix.as_ref().trim().to_lowercase(), uri.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl OntologyRegistry for StaticRegistry {
    async fn locate(&self, prefix: &str) -> Result<Option<String>, RegistryError> {
        Ok(self.entries.get(&prefix.trim().to_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{OntologyRegistry, StaticRegistry};

    #[tokio::test]
    async fn prefixes_match_case_insensitively() {
        let registry = StaticRegistry::new(BTreeMap::from([
            ("EFO".to_string(), " http://www.ebi.ac.uk/efo/efo.owl ".to_string()),
            ("  ".to_string(), "http://ignored.org".to_string()),
        ]))
        .with_entry("go", "http://purl.obolibrary.org/obo/go.owl");

        assert_eq!(
            registry.locate("efo").await.expect("lookup"),
            Some("http://www.ebi.ac.uk/efo/efo.owl".to_string())
        );
        assert_eq!(
            registry.locate(" GO ").await.expect("lookup"),
            Some("http://purl.obolibrary.org/obo/go.owl".to_string())
        );
        assert_eq!(registry.locate("hp").await.expect("lookup"), None);
        assert!(!registry.is_empty());
    }
}
