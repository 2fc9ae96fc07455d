//! Ontology loading and term resolution.
//!
//! The module is layered leaves first: value objects and vocabulary, the role
//! configuration, the loader turning a source locator into a read-only graph,
//! the resolver answering per-class term lookups, and the factory wiring them
//! together from host pipeline options.

pub mod configuration;
pub mod factory;
pub mod graph;
pub mod loader;
pub mod properties;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod value_objects;
pub mod vocabulary;

pub use configuration::{ConfigError, Role, RoleMapping, RoleMappingBuilder};
pub use factory::{
    build_helper, ConfigurationError, HelperBuildError, HelperOptions, OntologyHelperFactory,
};
pub use graph::{LoadedOntology, OntologySummary};
pub use loader::{FetchError, LoadError, OntologyLoader};
pub use registry::{OntologyRegistry, RegistryError, StaticRegistry};
pub use resolver::{ClassRelations, ResolveError, ResolvedTerms, TermResolver};
pub use source::{FetchSettings, OntologySource, SourceError};
pub use value_objects::{Iri, IriError};
