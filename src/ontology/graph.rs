use std::collections::BTreeSet;

use oxrdf::{Graph, NamedOrBlankNodeRef, TermRef, Triple};
use serde::Serialize;

use super::{
    value_objects::Iri,
    vocabulary::{OWL_CLASS, OWL_THING, RDFS_SUB_CLASS_OF, RDF_TYPE},
};

/// Read-only handle over a parsed ontology.
///
/// The graph is never mutated after construction, so a single instance can be
/// queried from many threads at once.
#[derive(Debug)]
pub struct LoadedOntology {
    location: String,
    graph: Graph,
}

/// Summary DTO describing a loaded ontology without exposing the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OntologySummary {
    /// Locator the ontology was read from.
    pub location: String,
    /// Number of distinct triples.
    pub triple_count: usize,
    /// Number of named `owl:Class` declarations.
    pub class_count: usize,
}

impl From<&LoadedOntology> for OntologySummary {
    fn from(ontology: &LoadedOntology) -> Self {
        Self {
            location: ontology.location.clone(),
            triple_count: ontology.graph.len(),
            class_count: ontology.class_count(),
        }
    }
}

impl LoadedOntology {
    #[must_use]
    pub fn new(location: impl Into<String>, graph: Graph) -> Self {
        Self {
            location: location.into(),
            graph,
        }
    }

    /// Builds a handle from already parsed triples.
    pub fn from_triples(
        location: impl Into<String>,
        triples: impl IntoIterator<Item = Triple>,
    ) -> Self {
        let mut graph = Graph::new();
        for triple in triples {
            graph.insert(&triple);
        }
        Self::new(location, graph)
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> OntologySummary {
        OntologySummary::from(self)
    }

    /// Whether the ontology states anything about `subject`.
    #[must_use]
    pub fn describes(&self, subject: &Iri) -> bool {
        self.graph
            .triples_for_subject(subject.as_node())
            .next()
            .is_some()
    }

    /// Values of `(subject, property, ?value)`.
    ///
    /// Literals yield their lexical form and IRIs their string form; blank
    /// nodes carry no displayable value and are skipped.
    pub fn values<'a>(
        &'a self,
        subject: &'a Iri,
        property: &'a Iri,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.graph
            .objects_for_subject_predicate(subject.as_node(), property.as_node())
            .filter_map(|object| match object {
                TermRef::Literal(literal) => Some(literal.value()),
                TermRef::NamedNode(node) => Some(node.as_str()),
                _ => None,
            })
    }

    /// Named classes `class` is asserted to be a direct subclass of.
    ///
    /// Anonymous superclasses (restrictions, unions) and `owl:Thing` are
    /// left out.
    #[must_use]
    pub fn super_classes(&self, class: &Iri) -> BTreeSet<Iri> {
        self.graph
            .objects_for_subject_predicate(class.as_node(), RDFS_SUB_CLASS_OF)
            .filter_map(|object| match object {
                TermRef::NamedNode(node) if node != OWL_THING => Some(Iri::from(node)),
                _ => None,
            })
            .collect()
    }

    /// Named classes asserted to be direct subclasses of `class`.
    #[must_use]
    pub fn sub_classes(&self, class: &Iri) -> BTreeSet<Iri> {
        self.graph
            .subjects_for_predicate_object(RDFS_SUB_CLASS_OF, class.as_node())
            .filter_map(|subject| match subject {
                NamedOrBlankNodeRef::NamedNode(node) => Some(Iri::from(node)),
                _ => None,
            })
            .collect()
    }

    fn class_count(&self) -> usize {
        self.graph
            .subjects_for_predicate_object(RDF_TYPE, OWL_CLASS)
            .filter(|subject| matches!(subject, NamedOrBlankNodeRef::NamedNode(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use oxrdf::{Literal, NamedNode, Triple};

    use super::LoadedOntology;
    use crate::ontology::{
        value_objects::Iri,
        vocabulary::{OWL_CLASS, OWL_THING, RDFS_LABEL, RDFS_SUB_CLASS_OF, RDF_TYPE},
    };

    fn node(text: &str) -> NamedNode {
        NamedNode::new(text).expect("valid iri")
    }

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn fixture() -> LoadedOntology {
        let disease = node("http://example.org/Disease");
        let cancer = node("http://example.org/Cancer");
        LoadedOntology::from_triples(
            "memory:fixture",
            [
                Triple::new(disease.clone(), RDF_TYPE.into_owned(), OWL_CLASS.into_owned()),
                Triple::new(cancer.clone(), RDF_TYPE.into_owned(), OWL_CLASS.into_owned()),
                Triple::new(
                    disease.clone(),
                    RDFS_SUB_CLASS_OF.into_owned(),
                    OWL_THING.into_owned(),
                ),
                Triple::new(cancer.clone(), RDFS_SUB_CLASS_OF.into_owned(), disease.clone()),
                Triple::new(
                    cancer.clone(),
                    RDFS_LABEL.into_owned(),
                    Literal::new_simple_literal("cancer"),
                ),
                Triple::new(
                    cancer,
                    RDFS_LABEL.into_owned(),
                    Literal::new_language_tagged_literal_unchecked("cancer", "en"),
                ),
            ],
        )
    }

    #[test]
    fn values_include_every_literal_form() {
        let ontology = fixture();
        let cancer = iri("http://example.org/Cancer");
        let label = Iri::from(RDFS_LABEL);
        let values: Vec<&str> = ontology.values(&cancer, &label).collect();
        assert_eq!(values, vec!["cancer", "cancer"]);
    }

    #[test]
    fn hierarchy_skips_owl_thing() {
        let ontology = fixture();
        let disease = iri("http://example.org/Disease");
        let cancer = iri("http://example.org/Cancer");
        assert!(ontology.super_classes(&disease).is_empty());
        assert_eq!(
            ontology.super_classes(&cancer).into_iter().collect::<Vec<_>>(),
            vec![disease.clone()]
        );
        assert_eq!(
            ontology.sub_classes(&disease).into_iter().collect::<Vec<_>>(),
            vec![cancer]
        );
    }

    #[test]
    fn summary_counts_named_classes() {
        let ontology = fixture();
        let summary = ontology.summary();
        assert_eq!(summary.location, "memory:fixture");
        assert_eq!(summary.triple_count, 6);
        assert_eq!(summary.class_count, 2);
        assert!(ontology.describes(&iri("http://example.org/Disease")));
        assert!(!ontology.describes(&iri("http://example.org/Unknown")));
    }
}
