//! Ontology term resolution for search index enrichment.
//!
//! A [`TermResolver`](ontology::TermResolver) loads an ontology once, maps
//! ontology property IRIs to label, synonym and definition roles, and hands out
//! cached term sets for class IRIs found in indexed documents. The
//! [`OntologyHelperFactory`](ontology::OntologyHelperFactory) validates the
//! host pipeline's options and builds a ready resolver.

pub mod config;
pub mod errors;
pub mod logger;
pub mod ontology;

pub use errors::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
