//! Well-known property and class IRIs used by biomedical ontologies.

use oxrdf::NamedNodeRef;

pub const RDFS_LABEL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#label");
pub const RDFS_SUB_CLASS_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subClassOf");
pub const RDF_TYPE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");

// owl
pub const OWL_CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
pub const OWL_THING: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");

// efo
pub const EFO_ALTERNATIVE_TERM: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.ebi.ac.uk/efo/alternative_term");
pub const EFO_DEFINITION: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.ebi.ac.uk/efo/definition");

// oboInOwl / IAO
pub const OBO_HAS_EXACT_SYNONYM: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.geneontology.org/formats/oboInOwl#hasExactSynonym");
pub const OBO_OBSOLETE_CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.geneontology.org/formats/oboInOwl#ObsoleteClass");
pub const IAO_DEFINITION: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://purl.obolibrary.org/obo/IAO_0000115");

/// Property used for labels when the configuration does not name one.
pub const DEFAULT_LABEL_PROPERTY: &str = RDFS_LABEL.as_str();
/// Property used for synonyms when the configuration does not name one.
pub const DEFAULT_SYNONYM_PROPERTY: &str = EFO_ALTERNATIVE_TERM.as_str();
/// Property used for definitions when the configuration does not name one.
pub const DEFAULT_DEFINITION_PROPERTY: &str = EFO_DEFINITION.as_str();

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_DEFINITION_PROPERTY, DEFAULT_LABEL_PROPERTY, DEFAULT_SYNONYM_PROPERTY,
        OBO_OBSOLETE_CLASS,
    };

    #[test]
    fn defaults_name_the_well_known_properties() {
        assert_eq!(DEFAULT_LABEL_PROPERTY, "http://www.w3.org/2000/01/rdf-schema#label");
        assert_eq!(DEFAULT_SYNONYM_PROPERTY, "http://www.ebi.ac.uk/efo/alternative_term");
        assert_eq!(DEFAULT_DEFINITION_PROPERTY, "http://www.ebi.ac.uk/efo/definition");
        assert!(OBO_OBSOLETE_CLASS.as_str().ends_with("oboInOwl#ObsoleteClass"));
    }
}
