//! Fetches ontology documents and parses them into [`LoadedOntology`]
//! handles.
//!
//! Locators are either `http(s)://` URLs (behind the `http` feature),
//! `file:` URLs, or plain filesystem paths. The serialization is picked from
//! the HTTP `Content-Type` when there is one, then from the file extension,
//! and falls back to RDF/XML, the usual OWL exchange syntax.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use oxrdf::{Graph, Triple};
use oxrdfio::{RdfFormat, RdfParser};
use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

use super::{
    configuration::RoleMapping,
    graph::LoadedOntology,
    registry::{OntologyRegistry, RegistryError},
    source::{FetchSettings, OntologySource},
    value_objects::IriError,
};

/// Failures while retrieving the bytes of an ontology document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("ontology document `{path}` does not exist")]
    NotFound { path: PathBuf },
    #[error("failed to read ontology document `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[cfg(feature = "http")]
    #[error("failed to fetch `{location}`: {source}")]
    Http {
        location: String,
        source: reqwest::Error,
    },
    #[error("fetching `{location}` returned HTTP status {status}")]
    Status { location: String, status: u16 },
    #[error("fetching `{location}` did not finish within {}s", .after.as_secs())]
    Timeout { location: String, after: Duration },
    #[error("unsupported scheme `{scheme}` in ontology locator `{location}`")]
    UnsupportedScheme { location: String, scheme: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failures while turning an [`OntologySource`] into a [`LoadedOntology`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The locator is not a well-formed URL or path.
    #[error("invalid ontology locator `{value}`: {message}")]
    InvalidLocator { value: String, message: String },
    /// The role mapping names a property that is not an IRI.
    #[error("invalid property in role mapping: {0}")]
    InvalidPropertyUri(#[from] IriError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The document was retrieved but is not valid RDF.
    #[error("failed to parse ontology `{location}`: {message}")]
    Parse { location: String, message: String },
    #[error("ontology registry does not know prefix `{prefix}`")]
    UnknownPrefix { prefix: String },
    #[error("no ontology registry is configured to resolve prefix `{prefix}`")]
    NoRegistry { prefix: String },
}

impl LoadError {
    /// Whether the failure came from retrieving (rather than parsing) the
    /// document.
    #[must_use]
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// Parsed form of a direct ontology locator.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Locator {
    Path(PathBuf),
    FileUrl { url: String, path: PathBuf },
    Http(String),
}

impl Locator {
    fn parse(value: &str) -> Result<Self, LoadError> {
        let value = value.trim();
        let invalid = |message: String| LoadError::InvalidLocator {
            value: value.to_string(),
            message,
        };

        let url = match Url::parse(value) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Ok(Self::Path(PathBuf::from(value)))
            }
            Err(err) => return Err(invalid(err.to_string())),
        };

        match url.scheme() {
            // `C:\data\efo.owl` parses as a URL with a one letter scheme.
            scheme if scheme.len() == 1 => Ok(Self::Path(PathBuf::from(value))),
            "file" => {
                if has_encoded_separator(&url) {
                    return Err(invalid(
                        "file URL path segments must not encode a path separator".to_string(),
                    ));
                }
                let path = url.to_file_path().map_err(|()| {
                    invalid("file URL must carry an absolute local path".to_string())
                })?;
                Ok(Self::FileUrl {
                    url: value.to_string(),
                    path,
                })
            }
            "http" | "https" => Ok(Self::Http(url.into())),
            other => Err(FetchError::UnsupportedScheme {
                location: value.to_string(),
                scheme: other.to_string(),
            }
            .into()),
        }
    }

    /// Base IRI used to resolve relative references inside the document.
    fn base_iri(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::FileUrl { url, .. } | Self::Http(url) => Some(url),
        }
    }
}

/// Whether a segment of `url` decodes to something holding `/` or `\`,
/// which would silently change the directory structure of the local path.
fn has_encoded_separator(url: &Url) -> bool {
    url.path_segments()
        .into_iter()
        .flatten()
        .any(|segment| percent_decode_str(segment).any(|byte| matches!(byte, b'/' | b'\\')))
}

/// Serialization for a document named `path`, if its extension says so.
#[must_use]
pub fn format_from_path(path: &Path) -> Option<RdfFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "owl" | "rdf" | "xml" => Some(RdfFormat::RdfXml),
        other => RdfFormat::from_extension(other),
    }
}

/// Serialization announced by an HTTP `Content-Type` value.
#[must_use]
pub fn format_from_media_type(content_type: &str) -> Option<RdfFormat> {
    let media_type = content_type.split(';').next()?.trim().to_ascii_lowercase();
    match media_type.as_str() {
        "application/rdf+xml" | "application/owl+xml" | "application/xml" | "text/xml" => {
            Some(RdfFormat::RdfXml)
        }
        other => RdfFormat::from_media_type(other),
    }
}

/// Raw document bytes plus whatever the transport said about their format.
struct Document {
    bytes: Vec<u8>,
    media_type: Option<String>,
}

/// Loads ontologies from direct locators or registry prefixes.
#[derive(Clone, Default)]
pub struct OntologyLoader {
    settings: FetchSettings,
    registry: Option<Arc<dyn OntologyRegistry>>,
}

impl std::fmt::Debug for OntologyLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyLoader")
            .field("settings", &self.settings)
            .field("registry", &self.registry.is_some())
            .finish()
    }
}

impl OntologyLoader {
    #[must_use]
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            settings,
            registry: None,
        }
    }

    /// Attaches the registry used for [`OntologySource::NamedPrefix`].
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn OntologyRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the fetch settings, keeping any attached registry.
    #[must_use]
    pub fn with_settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Fetches and parses the ontology `source` points at.
    ///
    /// Loading is expensive; it is meant to run once per resolver, before any
    /// term lookup.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidPropertyUri`] when `mapping` names a
    /// malformed property, [`LoadError::Fetch`] when the document cannot be
    /// retrieved within the configured deadline, and [`LoadError::Parse`] when
    /// it is not valid RDF.
    pub async fn load(
        &self,
        source: &OntologySource,
        mapping: &RoleMapping,
    ) -> Result<LoadedOntology, LoadError> {
        mapping.validate()?;

        let started = Instant::now();
        let deadline = tokio::time::Instant::from_std(started) + self.settings.timeout();

        let location = match source {
            OntologySource::DirectUri(uri) => uri.clone(),
            OntologySource::NamedPrefix(prefix) => self.locate(prefix, deadline).await?,
        };

        let locator = Locator::parse(&location)?;
        let document = self.fetch(&locator, &location, deadline).await?;
        let format = document
            .media_type
            .as_deref()
            .and_then(format_from_media_type)
            .or_else(|| format_from_path(Path::new(&location)))
            .unwrap_or(RdfFormat::RdfXml);

        let ontology = parse_document(
            location.clone(),
            locator.base_iri().map(str::to_string),
            format,
            document.bytes,
        )
        .await?;

        tracing::info!(
            location = %location,
            format = %format,
            triples = ontology.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ontology_loaded"
        );
        Ok(ontology)
    }

    async fn locate(
        &self,
        prefix: &str,
        deadline: tokio::time::Instant,
    ) -> Result<String, LoadError> {
        let Some(registry) = &self.registry else {
            return Err(LoadError::NoRegistry {
                prefix: prefix.to_string(),
            });
        };

        let located = tokio::time::timeout_at(deadline, registry.locate(prefix))
            .await
            .map_err(|_| FetchError::Timeout {
                location: format!("registry:{prefix}"),
                after: self.settings.timeout(),
            })?
            .map_err(FetchError::from)?;

        let location = located.ok_or_else(|| LoadError::UnknownPrefix {
            prefix: prefix.to_string(),
        })?;
        tracing::debug!(prefix, location = %location, "registry_prefix_resolved");
        Ok(location)
    }

    /// Retrieves the document, sharing `deadline` with any registry lookup
    /// that came before.
    async fn fetch(
        &self,
        locator: &Locator,
        location: &str,
        deadline: tokio::time::Instant,
    ) -> Result<Document, FetchError> {
        let fetch = async {
            match locator {
                Locator::Path(path) | Locator::FileUrl { path, .. } => read_file(path).await,
                Locator::Http(url) => self.fetch_http(url, deadline).await,
            }
        };
        tokio::time::timeout_at(deadline, fetch)
            .await
            .map_err(|_| FetchError::Timeout {
                location: location.to_string(),
                after: self.settings.timeout(),
            })?
    }

    #[cfg(feature = "http")]
    async fn fetch_http(
        &self,
        url: &str,
        deadline: tokio::time::Instant,
    ) -> Result<Document, FetchError> {
        let wrap = |source| FetchError::Http {
            location: url.to_string(),
            source,
        };

        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let client = reqwest::Client::builder()
            .user_agent(self.settings.user_agent.as_str())
            .timeout(remaining.max(Duration::from_millis(1)))
            .build()
            .map_err(wrap)?;
        let response = client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "application/rdf+xml, text/turtle;q=0.9, application/n-triples;q=0.8, */*;q=0.1",
            )
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    FetchError::Timeout {
                        location: url.to_string(),
                        after: self.settings.timeout(),
                    }
                } else {
                    wrap(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: url.to_string(),
                status: status.as_u16(),
            });
        }

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(wrap)?;
        Ok(Document {
            bytes: bytes.to_vec(),
            media_type,
        })
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_http(
        &self,
        url: &str,
        _deadline: tokio::time::Instant,
    ) -> Result<Document, FetchError> {
        Err(FetchError::UnsupportedScheme {
            location: url.to_string(),
            scheme: url.split(':').next().unwrap_or_default().to_string(),
        })
    }
}

async fn read_file(path: &Path) -> Result<Document, FetchError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            FetchError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            FetchError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(Document {
        bytes,
        media_type: None,
    })
}

/// Parses `bytes` off the async runtime; large ontologies take a while.
async fn parse_document(
    location: String,
    base_iri: Option<String>,
    format: RdfFormat,
    bytes: Vec<u8>,
) -> Result<LoadedOntology, LoadError> {
    let task_location = location.clone();
    tokio::task::spawn_blocking(move || parse_bytes(task_location, base_iri, format, &bytes))
        .await
        .map_err(|err| LoadError::Parse {
            location,
            message: format!("parser task failed: {err}"),
        })?
}

/// Parses a document held in memory.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] on the first syntax error and
/// [`LoadError::InvalidLocator`] when `base_iri` is not a valid IRI.
pub fn parse_bytes(
    location: String,
    base_iri: Option<String>,
    format: RdfFormat,
    bytes: &[u8],
) -> Result<LoadedOntology, LoadError> {
    let mut parser = RdfParser::from_format(format);
    if let Some(base) = base_iri {
        parser = parser
            .with_base_iri(base.as_str())
            .map_err(|err| LoadError::InvalidLocator {
                value: base.clone(),
                message: err.to_string(),
            })?;
    }

    let mut graph = Graph::new();
    for quad in parser.for_reader(bytes) {
        let quad = quad.map_err(|err| LoadError::Parse {
            location: location.clone(),
            message: err.to_string(),
        })?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(LoadedOntology::new(location, graph))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use oxrdfio::RdfFormat;

    use super::{format_from_media_type, format_from_path, FetchError, LoadError, Locator};

    #[test]
    fn plain_paths_and_drive_letters_are_paths() {
        assert_eq!(
            Locator::parse("/data/efo.owl").expect("absolute path"),
            Locator::Path(PathBuf::from("/data/efo.owl"))
        );
        assert_eq!(
            Locator::parse("C:\\data\\efo.owl").expect("drive letter"),
            Locator::Path(PathBuf::from("C:\\data\\efo.owl"))
        );
        assert_eq!(
            Locator::parse("https://www.ebi.ac.uk/efo/efo.owl").expect("http url"),
            Locator::Http("https://www.ebi.ac.uk/efo/efo.owl".into())
        );
    }

    #[test]
    fn file_urls_decode_to_paths() {
        assert_eq!(
            Locator::parse("file:///data/my%20ontology.ttl").expect("file url"),
            Locator::FileUrl {
                url: "file:///data/my%20ontology.ttl".into(),
                path: PathBuf::from("/data/my ontology.ttl"),
            }
        );
        assert!(matches!(
            Locator::parse("file://localhost/data/efo.owl").expect("file url"),
            Locator::FileUrl { path, .. } if path == Path::new("/data/efo.owl")
        ));
        assert!(matches!(
            Locator::parse("file://remote-host/data/efo.owl"),
            Err(LoadError::InvalidLocator { .. })
        ));
    }

    #[test]
    fn encoded_separators_in_file_urls_are_rejected() {
        for value in ["file:///data/a%2Fb.owl", "file:///data/a%2fb.owl", "file:///data/a%5Cb.owl"] {
            assert!(
                matches!(Locator::parse(value), Err(LoadError::InvalidLocator { .. })),
                "{value}"
            );
        }
    }

    #[test]
    fn malformed_and_unsupported_locators_are_rejected() {
        assert!(matches!(
            Locator::parse("http://exa mple.org/onto.owl"),
            Err(LoadError::InvalidLocator { .. })
        ));
        assert!(matches!(
            Locator::parse("ftp://example.org/onto.owl"),
            Err(LoadError::Fetch(FetchError::UnsupportedScheme { scheme, .. })) if scheme == "ftp"
        ));
        assert_eq!(
            Locator::parse("ontologies/efo.owl").expect("path"),
            Locator::Path(PathBuf::from("ontologies/efo.owl"))
        );
    }

    #[test]
    fn formats_follow_extension_then_media_type() {
        assert_eq!(format_from_path(Path::new("efo.OWL")), Some(RdfFormat::RdfXml));
        assert_eq!(format_from_path(Path::new("efo.ttl")), Some(RdfFormat::Turtle));
        assert_eq!(format_from_path(Path::new("efo.nt")), Some(RdfFormat::NTriples));
        assert_eq!(format_from_path(Path::new("efo")), None);
        assert_eq!(
            format_from_media_type("text/turtle; charset=utf-8"),
            Some(RdfFormat::Turtle)
        );
        assert_eq!(
            format_from_media_type("application/rdf+xml"),
            Some(RdfFormat::RdfXml)
        );
        assert_eq!(format_from_media_type("text/html"), None);
    }
}
