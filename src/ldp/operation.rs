//! Operation and response descriptions

use super::representation::{
    Representation, RepresentationPreferences, ResourceIdentifier,
};
use axum::http::Method;

/// Normalized request, constructed once per request by the request parser
#[derive(Debug)]
pub struct Operation {
    /// Request method
    pub method: Method,
    /// Target resource
    pub target: ResourceIdentifier,
    /// Client representation preferences
    pub preferences: RepresentationPreferences,
    /// Inbound representation, when the request carried a body
    pub body: Option<Representation>,
}

/// Result of executing an operation
///
/// Terminal artifact of the pipeline: not mutated after creation. The
/// identifier doubles as the `Location` of the affected resource, which for
/// creations points at the newly minted child.
#[derive(Debug)]
pub struct ResponseDescription {
    /// Affected resource
    pub identifier: ResourceIdentifier,
    /// Outbound representation, when the operation produced one
    pub body: Option<Representation>,
}

impl ResponseDescription {
    /// Response without a body
    pub fn empty(identifier: ResourceIdentifier) -> Self {
        Self {
            identifier,
            body: None,
        }
    }

    /// Response carrying a representation
    pub fn with_body(identifier: ResourceIdentifier, body: Representation) -> Self {
        Self {
            identifier,
            body: Some(body),
        }
    }
}
