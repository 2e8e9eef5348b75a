//! Request parsing strategies

use super::request::HttpRequest;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::AsyncHandler;
use crate::ldp::operation::Operation;
use crate::ldp::representation::{
    Preference, Representation, RepresentationData, RepresentationMetadata,
    RepresentationPreferences, ResourceIdentifier, SLUG,
};
use async_trait::async_trait;
use axum::http::header::{ACCEPT, CONTENT_TYPE, HOST};
use axum::http::HeaderMap;
use oxiri::Iri;
use percent_encoding::percent_decode_str;

/// Builds the target identifier from the host header and request path
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetExtractor;

impl TargetExtractor {
    /// Extract the target resource identifier
    pub fn extract(&self, request: &HttpRequest) -> HandlerResult<ResourceIdentifier> {
        let host = request
            .headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| HandlerError::BadRequest("missing host header".to_string()))?;
        let path = percent_decode_str(&request.path)
            .decode_utf8()
            .map_err(|_| HandlerError::BadRequest("invalid percent-encoding".to_string()))?;
        let url = format!("http://{host}{path}");
        Iri::parse(url.clone())
            .map_err(|e| HandlerError::BadRequest(format!("invalid target: {e}")))?;
        Ok(ResourceIdentifier::new(url))
    }
}

/// Parses weighted `Accept*` headers into representation preferences
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptPreferenceParser;

impl AcceptPreferenceParser {
    /// Parse all supported preference dimensions
    pub fn parse(&self, headers: &HeaderMap) -> RepresentationPreferences {
        RepresentationPreferences {
            content_type: Self::parse_header(headers, ACCEPT.as_str()),
            charset: Self::parse_header(headers, "accept-charset"),
            encoding: Self::parse_header(headers, "accept-encoding"),
            language: Self::parse_header(headers, "accept-language"),
        }
    }

    /// Parse one `value;q=weight, value;q=weight` header
    fn parse_header(headers: &HeaderMap, name: &str) -> Vec<Preference> {
        let Some(value) = headers.get(name).and_then(|value| value.to_str().ok()) else {
            return Vec::new();
        };
        value
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return None;
                }
                let mut segments = part.split(';');
                let value = segments.next()?.trim().to_lowercase();
                let weight = segments
                    .find_map(|segment| {
                        let segment = segment.trim();
                        segment
                            .strip_prefix("q=")
                            .and_then(|q| q.parse::<f64>().ok())
                    })
                    .unwrap_or(1.0)
                    .clamp(0.0, 1.0);
                Some(Preference::new(value, weight))
            })
            .collect()
    }
}

/// Turns the transport body into a binary representation
///
/// A request without a content type has no body. The `Slug` header rides
/// along in the representation metadata so stores can name created
/// resources after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBodyParser;

impl RawBodyParser {
    /// Parse the body, if any
    pub fn parse(&self, request: &mut HttpRequest) -> Option<Representation> {
        let content_type = request
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())?
            .to_string();
        let data = request.body.take()?;

        let mut metadata = RepresentationMetadata::with_content_type(content_type);
        if let Some(slug) = request
            .headers
            .get("slug")
            .and_then(|value| value.to_str().ok())
        {
            metadata.add(SLUG, slug);
        }
        Some(Representation::new(
            RepresentationData::Binary(data),
            metadata,
        ))
    }
}

/// Request parser combining target extraction, preference parsing and body
/// parsing into an [`Operation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRequestParser {
    target_extractor: TargetExtractor,
    preference_parser: AcceptPreferenceParser,
    body_parser: RawBodyParser,
}

impl BasicRequestParser {
    /// Create a parser from its strategies
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AsyncHandler for BasicRequestParser {
    type Input = HttpRequest;
    type Output = Operation;

    fn can_handle(&self, input: &HttpRequest) -> HandlerResult<()> {
        if input.path.starts_with('/') {
            Ok(())
        } else {
            Err(HandlerError::unsupported(
                "Only origin-form request targets are supported.",
            ))
        }
    }

    async fn handle(&self, mut input: HttpRequest) -> HandlerResult<Operation> {
        let target = self.target_extractor.extract(&input)?;
        let preferences = self.preference_parser.parse(&input.headers);
        let body = self.body_parser.parse(&mut input);
        Ok(Operation {
            method: input.method,
            target,
            preferences,
            body,
        })
    }
}
