//! Representation model flowing through the pipeline
//!
//! A [`Representation`] couples a lazy, single-pass payload with its
//! metadata. Payloads are either raw bytes or parsed quads; consuming one
//! twice without buffering is an error, so ownership transfers on every
//! pipeline handoff and callers that need the data more than once must
//! materialize it first.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use indexmap::IndexMap;
use oxrdf::Quad;
use std::fmt;
use std::io;

use crate::error::HandlerResult;

/// Metadata key holding the representation's content type
pub const CONTENT_TYPE: &str = "contentType";

/// Metadata key holding the client-suggested name for a created resource
pub const SLUG: &str = "slug";

/// Opaque, case-sensitive, hierarchical resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    /// Full identifier string (absolute URL)
    pub path: String,
}

impl ResourceIdentifier {
    /// Create an identifier from its path string
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the identifier denotes a container (trailing slash)
    pub fn is_container(&self) -> bool {
        self.path.ends_with('/')
    }

    /// Parent container of this identifier, if any
    ///
    /// The authority root (`http://host/`) has no parent.
    pub fn parent(&self) -> Option<ResourceIdentifier> {
        let rest = self.path.strip_suffix('/').unwrap_or(&self.path);
        let scheme_end = rest.find("://").map(|i| i + 3).unwrap_or(0);
        let last_slash = rest[scheme_end..].rfind('/')?;
        Some(ResourceIdentifier::new(
            &rest[..scheme_end + last_slash + 1],
        ))
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A single weighted preference value
#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    /// Preferred value, possibly a wildcard range such as `text/*`
    pub value: String,
    /// Weight in [0, 1], higher preferred
    pub weight: f64,
}

impl Preference {
    /// Create a preference
    pub fn new(value: impl Into<String>, weight: f64) -> Self {
        Self {
            value: value.into(),
            weight,
        }
    }
}

/// Client preferences per negotiable dimension
///
/// An empty set for a dimension means "no preference": any value is
/// acceptable at full weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepresentationPreferences {
    /// Content type preferences (`Accept`)
    pub content_type: Vec<Preference>,
    /// Charset preferences (`Accept-Charset`)
    pub charset: Vec<Preference>,
    /// Encoding preferences (`Accept-Encoding`)
    pub encoding: Vec<Preference>,
    /// Language preferences (`Accept-Language`)
    pub language: Vec<Preference>,
}

impl RepresentationPreferences {
    /// Preferences requesting exactly one content type at full weight
    pub fn content_type_only(content_type: impl Into<String>) -> Self {
        Self {
            content_type: vec![Preference::new(content_type, 1.0)],
            ..Default::default()
        }
    }
}

/// Metadata attached to a representation
///
/// Maps each key to one or more values. Converters derive new metadata from
/// their input's, overriding only the content type, so the map is cloned on
/// every transform rather than mutated in place.
#[derive(Debug, Clone, Default)]
pub struct RepresentationMetadata {
    entries: IndexMap<String, Vec<String>>,
}

impl RepresentationMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metadata carrying only a content type
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        let mut metadata = Self::new();
        metadata.set_content_type(content_type);
        metadata
    }

    /// Append a value under a key
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values under a key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    /// All values under a key
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value under a key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }

    /// Content type of the representation, if set
    pub fn content_type(&self) -> Option<&str> {
        self.first(CONTENT_TYPE)
    }

    /// Set the content type
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.set(CONTENT_TYPE, content_type);
    }

    /// Derived copy with the content type overridden
    pub fn derive(&self, content_type: impl Into<String>) -> Self {
        let mut metadata = self.clone();
        metadata.set_content_type(content_type);
        metadata
    }
}

/// Lazy single-pass representation payload
///
/// `Binary` carries raw bytes; `Quads` carries the structured internal form.
/// Streams are finite but not restartable: re-reading requires re-fetching
/// from the store.
pub enum RepresentationData {
    /// Raw byte chunks
    Binary(BoxStream<'static, io::Result<Bytes>>),
    /// Parsed quads
    Quads(BoxStream<'static, io::Result<Quad>>),
}

impl RepresentationData {
    /// Wrap an already-buffered byte payload
    pub fn from_bytes(bytes: impl Into<Bytes> + Send + 'static) -> Self {
        RepresentationData::Binary(stream::once(async move { Ok(bytes.into()) }).boxed())
    }

    /// Wrap an already-buffered quad payload
    pub fn from_quads(quads: Vec<Quad>) -> Self {
        RepresentationData::Quads(stream::iter(quads.into_iter().map(Ok)).boxed())
    }

    /// Whether the payload is raw bytes rather than the structured form
    pub fn is_binary(&self) -> bool {
        matches!(self, RepresentationData::Binary(_))
    }

    /// Drain a binary payload into one owned buffer
    ///
    /// Fails on quad payloads: structured data has to go through a converter
    /// before it can be read as bytes.
    pub async fn into_bytes(self) -> HandlerResult<Bytes> {
        match self {
            RepresentationData::Binary(mut data) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = data.next().await {
                    buffer.extend_from_slice(&chunk?);
                }
                Ok(buffer.freeze())
            }
            RepresentationData::Quads(_) => Err(crate::error::HandlerError::Internal(
                "cannot read a quad payload as raw bytes".to_string(),
            )),
        }
    }

    /// Drain a quad payload into an owned vector
    pub async fn into_quads(self) -> HandlerResult<Vec<Quad>> {
        match self {
            RepresentationData::Quads(mut data) => {
                let mut quads = Vec::new();
                while let Some(quad) = data.next().await {
                    quads.push(quad?);
                }
                Ok(quads)
            }
            RepresentationData::Binary(_) => Err(crate::error::HandlerError::Internal(
                "cannot read a binary payload as quads".to_string(),
            )),
        }
    }
}

impl fmt::Debug for RepresentationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepresentationData::Binary(_) => f.write_str("RepresentationData::Binary(..)"),
            RepresentationData::Quads(_) => f.write_str("RepresentationData::Quads(..)"),
        }
    }
}

/// A resource's content plus metadata in a specific content type
pub struct Representation {
    /// Payload, consumed at most once
    pub data: RepresentationData,
    /// Metadata, including the content type once finalized
    pub metadata: RepresentationMetadata,
}

impl Representation {
    /// Create a representation
    pub fn new(data: RepresentationData, metadata: RepresentationMetadata) -> Self {
        Self { data, metadata }
    }

    /// Whether the payload is raw bytes
    pub fn is_binary(&self) -> bool {
        self.data.is_binary()
    }
}

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("binary", &self.is_binary())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
