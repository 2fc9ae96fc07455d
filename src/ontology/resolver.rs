//! Per-class term lookups over a loaded ontology.
//!
//! Each distinct class IRI is resolved at most once: results live in
//! unbounded `moka` caches for the lifetime of the resolver, and concurrent
//! first requests for the same IRI are coalesced so only one of them walks the
//! graph.

use std::{
    collections::{BTreeSet, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use moka::sync::Cache;
use serde::Serialize;
use thiserror::Error;

use super::{
    configuration::{Role, RoleMapping},
    graph::{LoadedOntology, OntologySummary},
    value_objects::{Iri, IriError},
};

/// Role-tagged terms found for one class.
///
/// Ignored properties never contribute; every set is deduplicated by exact,
/// case-sensitive match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedTerms {
    pub uri: String,
    pub labels: BTreeSet<String>,
    pub synonyms: BTreeSet<String>,
    pub definitions: BTreeSet<String>,
}

impl ResolvedTerms {
    #[must_use]
    pub fn empty(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Whether no term at all was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.synonyms.is_empty() && self.definitions.is_empty()
    }

    /// Terms collected for `role`; [`Role::Ignore`] is always empty.
    #[must_use]
    pub fn terms(&self, role: Role) -> Option<&BTreeSet<String>> {
        match role {
            Role::Label => Some(&self.labels),
            Role::Synonym => Some(&self.synonyms),
            Role::Definition => Some(&self.definitions),
            Role::Ignore => None,
        }
    }

    fn terms_mut(&mut self, role: Role) -> Option<&mut BTreeSet<String>> {
        match role {
            Role::Label => Some(&mut self.labels),
            Role::Synonym => Some(&mut self.synonyms),
            Role::Definition => Some(&mut self.definitions),
            Role::Ignore => None,
        }
    }
}

/// Direct, asserted `rdfs:subClassOf` neighbours of a class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassRelations {
    pub uri: String,
    pub parents: BTreeSet<String>,
    pub children: BTreeSet<String>,
}

/// Errors raised by a single lookup. They are not cached; the caller decides
/// whether to retry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid class IRI: {0}")]
    InvalidClassUri(#[from] IriError),
}

/// Resolves class IRIs into display terms.
///
/// Cloning is cheap: clones share the ontology graph and the caches, so one
/// resolver built at startup can be handed to every indexing worker.
#[derive(Clone)]
pub struct TermResolver {
    ontology: Arc<LoadedOntology>,
    mapping: Arc<RoleMapping>,
    plan: Arc<[(Iri, Vec<Role>)]>,
    terms: Cache<String, Arc<ResolvedTerms>>,
    relations: Cache<String, Arc<ClassRelations>>,
    traversals: Arc<AtomicU64>,
    relation_walks: Arc<AtomicU64>,
}

impl std::fmt::Debug for TermResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermResolver")
            .field("ontology", &self.ontology.location())
            .field("mapping", &self.mapping)
            .field("traversals", &self.traversal_count())
            .field("relation_walks", &self.relation_walk_count())
            .finish_non_exhaustive()
    }
}

impl TermResolver {
    /// Creates a resolver owning `ontology`.
    ///
    /// # Errors
    ///
    /// Fails when `mapping` names a property that is not a valid IRI.
    pub fn new(ontology: LoadedOntology, mapping: RoleMapping) -> Result<Self, IriError> {
        let plan = mapping.extraction_plan()?;
        tracing::debug!(
            ontology = ontology.location(),
            properties = plan.len(),
            "term_resolver_created"
        );
        Ok(Self {
            ontology: Arc::new(ontology),
            mapping: Arc::new(mapping),
            plan: plan.into(),
            terms: Cache::builder().name("ontology-terms").build(),
            relations: Cache::builder().name("ontology-relations").build(),
            traversals: Arc::new(AtomicU64::new(0)),
            relation_walks: Arc::new(AtomicU64::new(0)),
        })
    }

    #[must_use]
    pub fn ontology(&self) -> &LoadedOntology {
        &self.ontology
    }

    #[must_use]
    pub fn mapping(&self) -> &RoleMapping {
        &self.mapping
    }

    #[must_use]
    pub fn summary(&self) -> OntologySummary {
        self.ontology.summary()
    }

    /// Number of term extraction walks performed so far; cache hits do not
    /// count.
    #[must_use]
    pub fn traversal_count(&self) -> u64 {
        self.traversals.load(Ordering::Relaxed)
    }

    /// Number of parent/child lookups performed by [`Self::relations`];
    /// cache hits do not count.
    #[must_use]
    pub fn relation_walk_count(&self) -> u64 {
        self.relation_walks.load(Ordering::Relaxed)
    }

    /// Whether the terms of `class_uri` are already cached.
    #[must_use]
    pub fn is_cached(&self, class_uri: &str) -> bool {
        self.terms.contains_key(class_uri.trim())
    }

    /// Labels, synonyms and definitions of `class_uri`.
    ///
    /// A class the ontology knows nothing about resolves to empty sets; that
    /// result is cached like any other.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidClassUri`] when `class_uri` is not an
    /// IRI.
    pub fn resolve_terms(&self, class_uri: &str) -> Result<Arc<ResolvedTerms>, ResolveError> {
        let class = Iri::new(class_uri)?;
        let key = class.as_str().to_string();
        Ok(self.terms.get_with(key, || {
            self.traversals.fetch_add(1, Ordering::Relaxed);
            Arc::new(self.extract_terms(&class))
        }))
    }

    fn extract_terms(&self, class: &Iri) -> ResolvedTerms {
        let mut resolved = ResolvedTerms::empty(class.as_str());
        for (property, roles) in self.plan.iter() {
            for value in self.ontology.values(class, property) {
                for role in roles {
                    if let Some(terms) = resolved.terms_mut(*role) {
                        terms.insert(value.to_string());
                    }
                }
            }
        }

        if resolved.is_empty() && !self.ontology.describes(class) {
            tracing::debug!(class = %class, "class_not_in_ontology");
        } else {
            tracing::trace!(
                class = %class,
                labels = resolved.labels.len(),
                synonyms = resolved.synonyms.len(),
                definitions = resolved.definitions.len(),
                "terms_resolved"
            );
        }
        resolved
    }

    /// # Errors
    ///
    /// See [`TermResolver::resolve_terms`].
    pub fn labels(&self, class_uri: &str) -> Result<BTreeSet<String>, ResolveError> {
        Ok(self.resolve_terms(class_uri)?.labels.clone())
    }

    /// # Errors
    ///
    /// See [`TermResolver::resolve_terms`].
    pub fn synonyms(&self, class_uri: &str) -> Result<BTreeSet<String>, ResolveError> {
        Ok(self.resolve_terms(class_uri)?.synonyms.clone())
    }

    /// # Errors
    ///
    /// See [`TermResolver::resolve_terms`].
    pub fn definitions(&self, class_uri: &str) -> Result<BTreeSet<String>, ResolveError> {
        Ok(self.resolve_terms(class_uri)?.definitions.clone())
    }

    /// Labels of several classes at once, e.g. to index the names of a
    /// class's parents next to their IRIs.
    ///
    /// # Errors
    ///
    /// Fails on the first IRI that is malformed.
    pub fn find_labels<I, S>(&self, class_uris: I) -> Result<BTreeSet<String>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels = BTreeSet::new();
        for uri in class_uris {
            labels.extend(self.resolve_terms(uri.as_ref())?.labels.iter().cloned());
        }
        Ok(labels)
    }

    /// Direct parents and children of `class_uri`, cached like terms.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidClassUri`] when `class_uri` is not an
    /// IRI.
    pub fn relations(&self, class_uri: &str) -> Result<Arc<ClassRelations>, ResolveError> {
        let class = Iri::new(class_uri)?;
        let key = class.as_str().to_string();
        Ok(self.relations.get_with(key, || {
            self.relation_walks.fetch_add(1, Ordering::Relaxed);
            let as_strings = |set: BTreeSet<Iri>| {
                set.into_iter()
                    .map(|iri| iri.as_str().to_string())
                    .collect()
            };
            Arc::new(ClassRelations {
                uri: class.as_str().to_string(),
                parents: as_strings(self.ontology.super_classes(&class)),
                children: as_strings(self.ontology.sub_classes(&class)),
            })
        }))
    }

    /// Every class reachable through asserted `rdfs:subClassOf` edges, nearest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidClassUri`] when `class_uri` is not an
    /// IRI.
    pub fn ancestors(&self, class_uri: &str) -> Result<Vec<String>, ResolveError> {
        self.walk(class_uri, |relations| &relations.parents)
    }

    /// Every class that reaches `class_uri` through asserted
    /// `rdfs:subClassOf` edges, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidClassUri`] when `class_uri` is not an
    /// IRI.
    pub fn descendants(&self, class_uri: &str) -> Result<Vec<String>, ResolveError> {
        self.walk(class_uri, |relations| &relations.children)
    }

    fn walk(
        &self,
        class_uri: &str,
        next: impl Fn(&ClassRelations) -> &BTreeSet<String>,
    ) -> Result<Vec<String>, ResolveError> {
        let start = self.relations(class_uri)?;
        let mut visited = BTreeSet::from([start.uri.clone()]);
        let mut to_visit: VecDeque<String> = next(&start).iter().cloned().collect();
        let mut result = Vec::new();

        while let Some(current) = to_visit.pop_front() {
            if visited.insert(current.clone()) {
                result.push(current.clone());
                let relations = self.relations(&current)?;
                to_visit.extend(next(&relations).iter().cloned());
            }
        }

        Ok(result)
    }
}
