//! Mapping of ontology property IRIs to the roles they play in term
//! extraction.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    properties::{self, PropertiesError},
    value_objects::{Iri, IriError},
    vocabulary::{DEFAULT_DEFINITION_PROPERTY, DEFAULT_LABEL_PROPERTY, DEFAULT_SYNONYM_PROPERTY},
};

pub const LABEL_PROPERTIES_KEY: &str = "label_properties";
pub const SYNONYM_PROPERTIES_KEY: &str = "synonym_properties";
pub const DEFINITION_PROPERTIES_KEY: &str = "definition_properties";
pub const IGNORE_PROPERTIES_KEY: &str = "ignore_properties";
pub const ONTOLOGY_URI_KEY: &str = "ontology_uri";
pub const OLS_PREFIX_KEY: &str = "ols_prefix";

/// Semantic purpose assigned to an ontology property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Label,
    Synonym,
    Definition,
    /// Values of ignored properties are dropped, whatever other role the
    /// property is also listed under.
    Ignore,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Label, Self::Synonym, Self::Definition, Self::Ignore];

    /// Key naming this role in a properties file.
    #[must_use]
    pub fn properties_key(self) -> &'static str {
        match self {
            Self::Label => LABEL_PROPERTIES_KEY,
            Self::Synonym => SYNONYM_PROPERTIES_KEY,
            Self::Definition => DEFINITION_PROPERTIES_KEY,
            Self::Ignore => IGNORE_PROPERTIES_KEY,
        }
    }

    fn from_properties_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.properties_key() == key)
    }

    /// Built-in property list used when the caller does not declare the role.
    #[must_use]
    pub fn default_uris(self) -> Vec<String> {
        match self {
            Self::Label => vec![DEFAULT_LABEL_PROPERTY.to_string()],
            Self::Synonym => vec![DEFAULT_SYNONYM_PROPERTY.to_string()],
            Self::Definition => vec![DEFAULT_DEFINITION_PROPERTY.to_string()],
            Self::Ignore => Vec::new(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Label => "label",
            Self::Synonym => "synonym",
            Self::Definition => "definition",
            Self::Ignore => "ignore",
        };
        f.write_str(name)
    }
}

/// Errors raised while reading a role mapping from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration path does not name an existing file.
    #[error("no such configuration file `{path}`")]
    NotFound { path: PathBuf },
    /// The file exists but its content is not valid properties syntax.
    #[error("malformed configuration file `{path}`: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    /// Reading the file failed.
    #[error("failed to read configuration file `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConfigError {
    fn parse(path: &Path, err: &PropertiesError) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            line: err.line(),
            message: err.to_string(),
        }
    }
}

/// Immutable assignment of property IRIs to [`Role`]s.
///
/// Each role keeps its IRIs in declaration order without duplicates. A role
/// that the caller declares replaces the built-in default list; roles left
/// out fall back to [`Role::default_uris`].
///
/// A mapping read from a file may also name the ontology it applies to, via
/// `ontology_uri` or `ols_prefix`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRoleMapping")]
pub struct RoleMapping {
    label: Vec<String>,
    synonym: Vec<String>,
    definition: Vec<String>,
    ignore: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ontology_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ols_prefix: Option<String>,
}

/// Serialized form of a [`RoleMapping`], before defaults and deduplication.
#[derive(Deserialize)]
struct RawRoleMapping {
    #[serde(default)]
    label: Option<Vec<String>>,
    #[serde(default)]
    synonym: Option<Vec<String>>,
    #[serde(default)]
    definition: Option<Vec<String>>,
    #[serde(default)]
    ignore: Option<Vec<String>>,
    #[serde(default)]
    ontology_uri: Option<String>,
    #[serde(default)]
    ols_prefix: Option<String>,
}

impl From<RawRoleMapping> for RoleMapping {
    fn from(raw: RawRoleMapping) -> Self {
        let mut builder = RoleMappingBuilder::default();
        for (role, uris) in [
            (Role::Label, raw.label),
            (Role::Synonym, raw.synonym),
            (Role::Definition, raw.definition),
            (Role::Ignore, raw.ignore),
        ] {
            if let Some(uris) = uris {
                builder = builder.role(role, uris);
            }
        }
        if let Some(uri) = raw.ontology_uri {
            builder = builder.ontology_uri(uri);
        }
        if let Some(prefix) = raw.ols_prefix {
            builder = builder.ols_prefix(prefix);
        }
        builder.build()
    }
}

impl Default for RoleMapping {
    fn default() -> Self {
        Self::default_configuration()
    }
}

impl RoleMapping {
    /// Mapping made only of the built-in defaults.
    #[must_use]
    pub fn default_configuration() -> Self {
        RoleMappingBuilder::default().build()
    }

    /// Starts a mapping where every role holds its default until overridden.
    #[must_use]
    pub fn builder() -> RoleMappingBuilder {
        RoleMappingBuilder::default()
    }

    /// Reads a mapping from a properties file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when `path` is not an existing file,
    /// [`ConfigError::Io`] when it cannot be read and [`ConfigError::Parse`]
    /// when its syntax is malformed.
    pub fn from_properties_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mapping = Self::parse_properties(&text).map_err(|err| ConfigError::parse(path, &err))?;
        tracing::debug!(
            path = %path.display(),
            labels = mapping.label.len(),
            synonyms = mapping.synonym.len(),
            definitions = mapping.definition.len(),
            ignored = mapping.ignore.len(),
            "role_mapping_loaded"
        );
        Ok(mapping)
    }

    /// Reads a mapping from properties text.
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError`] when the text is not valid properties syntax.
    pub fn from_properties_str(text: &str) -> Result<Self, PropertiesError> {
        Self::parse_properties(text)
    }

    fn parse_properties(text: &str) -> Result<Self, PropertiesError> {
        let mut builder = RoleMappingBuilder::default();
        for entry in properties::parse(text)? {
            let key = entry.key.trim();
            if let Some(role) = Role::from_properties_key(key) {
                builder = builder.role(role, split_values(&entry.value));
            } else if key == ONTOLOGY_URI_KEY {
                builder = builder.ontology_uri(entry.value);
            } else if key == OLS_PREFIX_KEY {
                builder = builder.ols_prefix(entry.value);
            } else {
                tracing::debug!(key, line = entry.line, "ignoring unrecognised configuration key");
            }
        }
        Ok(builder.build())
    }

    #[must_use]
    pub fn label_property_uris(&self) -> &[String] {
        &self.label
    }

    #[must_use]
    pub fn synonym_property_uris(&self) -> &[String] {
        &self.synonym
    }

    #[must_use]
    pub fn definition_property_uris(&self) -> &[String] {
        &self.definition
    }

    #[must_use]
    pub fn ignore_property_uris(&self) -> &[String] {
        &self.ignore
    }

    /// Property IRIs declared for `role`.
    #[must_use]
    pub fn uris_for(&self, role: Role) -> &[String] {
        match role {
            Role::Label => &self.label,
            Role::Synonym => &self.synonym,
            Role::Definition => &self.definition,
            Role::Ignore => &self.ignore,
        }
    }

    /// Extraction roles `property` contributes to.
    ///
    /// A property listed under [`Role::Ignore`] yields no role at all, even if
    /// it is also listed elsewhere. A property listed under several extraction
    /// roles contributes to each of them.
    #[must_use]
    pub fn roles_for(&self, property: &str) -> Vec<Role> {
        if self.ignore.iter().any(|uri| uri == property) {
            return Vec::new();
        }
        [Role::Label, Role::Synonym, Role::Definition]
            .into_iter()
            .filter(|role| self.uris_for(*role).iter().any(|uri| uri == property))
            .collect()
    }

    /// Every non-ignored property with the roles it feeds, in role then
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`IriError`] for the first extracted property that is not a
    /// valid IRI.
    pub fn extraction_plan(&self) -> Result<Vec<(Iri, Vec<Role>)>, IriError> {
        let mut plan: Vec<(Iri, Vec<Role>)> = Vec::new();
        for role in [Role::Label, Role::Synonym, Role::Definition] {
            for uri in self.uris_for(role) {
                if plan.iter().any(|(iri, _)| iri.as_str() == uri.as_str()) {
                    continue;
                }
                let roles = self.roles_for(uri);
                if roles.is_empty() {
                    continue;
                }
                plan.push((Iri::new(uri.as_str())?, roles));
            }
        }
        Ok(plan)
    }

    /// Checks that every declared property is a valid IRI.
    ///
    /// # Errors
    ///
    /// Returns the first property that fails validation.
    pub fn validate(&self) -> Result<(), IriError> {
        for role in Role::ALL {
            for uri in self.uris_for(role) {
                Iri::new(uri.as_str())?;
            }
        }
        Ok(())
    }

    /// Direct ontology locator carried by the configuration, if any.
    #[must_use]
    pub fn ontology_uri(&self) -> Option<&str> {
        self.ontology_uri.as_deref()
    }

    /// Named-registry prefix carried by the configuration, if any.
    #[must_use]
    pub fn ols_prefix(&self) -> Option<&str> {
        self.ols_prefix.as_deref()
    }
}

fn split_values(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn dedup_in_order(uris: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for uri in uris {
        if !seen.contains(&uri) {
            seen.push(uri);
        }
    }
    seen
}

/// Builder for [`RoleMapping`].
#[derive(Clone, Debug, Default)]
pub struct RoleMappingBuilder {
    label: Option<Vec<String>>,
    synonym: Option<Vec<String>>,
    definition: Option<Vec<String>>,
    ignore: Option<Vec<String>>,
    ontology_uri: Option<String>,
    ols_prefix: Option<String>,
}

impl RoleMappingBuilder {
    /// Replaces the property list for `role`.
    #[must_use]
    pub fn role<I, S>(mut self, role: Role, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let uris = Some(uris.into_iter().map(Into::into).collect());
        match role {
            Role::Label => self.label = uris,
            Role::Synonym => self.synonym = uris,
            Role::Definition => self.definition = uris,
            Role::Ignore => self.ignore = uris,
        }
        self
    }

    #[must_use]
    pub fn label<I, S>(self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role(Role::Label, uris)
    }

    #[must_use]
    pub fn synonym<I, S>(self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role(Role::Synonym, uris)
    }

    #[must_use]
    pub fn definition<I, S>(self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role(Role::Definition, uris)
    }

    #[must_use]
    pub fn ignore<I, S>(self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role(Role::Ignore, uris)
    }

    /// Records the direct ontology locator; blank values are ignored.
    #[must_use]
    pub fn ontology_uri(mut self, uri: impl Into<String>) -> Self {
        self.ontology_uri = non_blank(uri.into());
        self
    }

    /// Records the named-registry prefix; blank values are ignored.
    #[must_use]
    pub fn ols_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ols_prefix = non_blank(prefix.into());
        self
    }

    #[must_use]
    pub fn build(self) -> RoleMapping {
        let resolve = |declared: Option<Vec<String>>, role: Role| {
            dedup_in_order(declared.unwrap_or_else(|| role.default_uris()))
        };
        RoleMapping {
            label: resolve(self.label, Role::Label),
            synonym: resolve(self.synonym, Role::Synonym),
            definition: resolve(self.definition, Role::Definition),
            ignore: resolve(self.ignore, Role::Ignore),
            ontology_uri: self.ontology_uri,
            ols_prefix: self.ols_prefix,
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Role, RoleMapping};
    use crate::ontology::vocabulary::{
        DEFAULT_DEFINITION_PROPERTY, DEFAULT_LABEL_PROPERTY, DEFAULT_SYNONYM_PROPERTY,
    };

    #[test]
    fn default_configuration_uses_builtin_properties() {
        let mapping = RoleMapping::default_configuration();
        assert_eq!(mapping.label_property_uris(), [DEFAULT_LABEL_PROPERTY]);
        assert_eq!(mapping.synonym_property_uris(), [DEFAULT_SYNONYM_PROPERTY]);
        assert_eq!(mapping.definition_property_uris(), [DEFAULT_DEFINITION_PROPERTY]);
        assert!(mapping.ignore_property_uris().is_empty());
        assert_eq!(mapping.ontology_uri(), None);
        assert_eq!(mapping, RoleMapping::default());
    }

    #[test]
    fn declared_role_replaces_default_and_drops_duplicates() {
        let mapping = RoleMapping::from_properties_str(
            "synonym_properties = http://b.org/s, http://a.org/s,, http://b.org/s ,\n",
        )
        .expect("valid properties");
        assert_eq!(
            mapping.synonym_property_uris(),
            ["http://b.org/s", "http://a.org/s"]
        );
        assert_eq!(mapping.label_property_uris(), [DEFAULT_LABEL_PROPERTY]);
    }

    #[test]
    fn later_key_replaces_earlier_one() {
        let mapping = RoleMapping::from_properties_str(
            "label_properties = http://a.org/one\nlabel_properties = http://a.org/two\n",
        )
        .expect("valid properties");
        assert_eq!(mapping.label_property_uris(), ["http://a.org/two"]);
    }

    #[test]
    fn declared_empty_role_stays_empty() {
        let mapping =
            RoleMapping::from_properties_str("definition_properties =\n").expect("valid properties");
        assert!(mapping.definition_property_uris().is_empty());
    }

    #[test]
    fn source_keys_are_carried() {
        let mapping = RoleMapping::from_properties_str(
            "ontology_uri = file:///data/efo.owl\nols_prefix =   \nunknown = 1\n",
        )
        .expect("valid properties");
        assert_eq!(mapping.ontology_uri(), Some("file:///data/efo.owl"));
        assert_eq!(mapping.ols_prefix(), None);
    }

    #[test]
    fn ignore_wins_over_other_roles() {
        let mapping = RoleMapping::builder()
            .label(["http://a.org/p", "http://a.org/q"])
            .synonym(["http://a.org/p", "http://a.org/q"])
            .ignore(["http://a.org/p"])
            .build();
        assert!(mapping.roles_for("http://a.org/p").is_empty());
        assert_eq!(
            mapping.roles_for("http://a.org/q"),
            vec![Role::Label, Role::Synonym]
        );
        assert!(mapping.roles_for("http://a.org/unlisted").is_empty());

        let plan = mapping.extraction_plan().expect("valid plan");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0.as_str(), "http://a.org/q");
        assert_eq!(plan[0].1, vec![Role::Label, Role::Synonym]);
    }

    #[test]
    fn validate_rejects_relative_property() {
        let mapping = RoleMapping::builder().label(["rdfs label"]).build();
        assert!(mapping.validate().is_err());
        assert!(RoleMapping::default().validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults_for_missing_roles() {
        let mapping: RoleMapping =
            serde_yaml::from_str("synonym:\n  - http://a.org/s\n").expect("valid yaml");
        assert_eq!(mapping.synonym_property_uris(), ["http://a.org/s"]);
        assert_eq!(mapping.label_property_uris(), [DEFAULT_LABEL_PROPERTY]);
        assert!(mapping.ignore_property_uris().is_empty());
    }

    #[test]
    fn deserialized_mapping_drops_duplicates_and_blank_sources() {
        let yaml = "synonym:\n  - http://a.org/s\n  - http://a.org/t\n  - http://a.org/s\n\
                    ignore: [http://a.org/i, http://a.org/i]\n\
                    ontology_uri: '  '\n\
                    ols_prefix: ' efo '\n";
        let mapping: RoleMapping = serde_yaml::from_str(yaml).expect("valid yaml");

        assert_eq!(mapping.synonym_property_uris(), ["http://a.org/s", "http://a.org/t"]);
        assert_eq!(mapping.ignore_property_uris(), ["http://a.org/i"]);
        assert_eq!(mapping.definition_property_uris(), [DEFAULT_DEFINITION_PROPERTY]);
        assert_eq!(mapping.ontology_uri(), None);
        assert_eq!(mapping.ols_prefix(), Some("efo"));

        let written = serde_yaml::to_string(&mapping).expect("serializes");
        let reread: RoleMapping = serde_yaml::from_str(&written).expect("reads back");
        assert_eq!(reread, mapping);
    }
}
