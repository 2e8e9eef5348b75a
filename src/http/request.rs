//! Transport-level request

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt;
use std::io;

/// Raw incoming request, decoupled from the hosting transport
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Request path, percent-encoded as received
    pub path: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body as a single-pass byte stream
    pub body: Option<BoxStream<'static, io::Result<Bytes>>>,
}

impl HttpRequest {
    /// Request without a body
    pub fn without_body(method: Method, path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body: None,
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("has_body", &self.body.is_some())
            .finish_non_exhaustive()
    }
}
