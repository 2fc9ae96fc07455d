use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::{NamedNode, NamedNodeRef};
use thiserror::Error;

/// Value object ensuring that supplied text represents a valid IRI.
///
/// Class and property identifiers coming from documents or configuration files
/// pass through this type before they reach the graph, so lookups never run
/// against malformed identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri {
    node: NamedNode,
}

impl Iri {
    /// Validates and constructs a new [`Iri`].
    ///
    /// Surrounding whitespace is trimmed; anything else that does not parse as
    /// an absolute IRI is rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        let trimmed = value.trim();
        let node = NamedNode::new(trimmed).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { node })
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.node.as_str()
    }

    /// Borrows the IRI as an RDF named node for graph lookups.
    #[must_use]
    pub fn as_node(&self) -> NamedNodeRef<'_> {
        self.node.as_ref()
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NamedNode> for Iri {
    fn from(node: NamedNode) -> Self {
        Self { node }
    }
}

impl From<NamedNodeRef<'_>> for Iri {
    fn from(node: NamedNodeRef<'_>) -> Self {
        Self {
            node: node.into_owned(),
        }
    }
}

/// Errors produced when validating an [`Iri`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
}

#[cfg(test)]
mod tests {
    use super::Iri;

    #[test]
    fn accepts_class_iri() {
        let iri = Iri::new("http://www.ebi.ac.uk/efo/EFO_0000001").expect("valid IRI");
        assert_eq!(iri.as_str(), "http://www.ebi.ac.uk/efo/EFO_0000001");
        assert_eq!(iri.as_node().as_str(), iri.as_str());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let iri = Iri::new("  http://purl.obolibrary.org/obo/IAO_0000115 \n").expect("valid IRI");
        assert_eq!(iri.as_str(), "http://purl.obolibrary.org/obo/IAO_0000115");
    }

    #[test]
    fn rejects_relative_reference() {
        let err = Iri::new("EFO_0000001").expect_err("relative reference");
        assert!(matches!(err, super::IriError::Invalid { value } if value == "EFO_0000001"));
    }
}
