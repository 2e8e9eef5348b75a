//! Credentials extraction strategies

use crate::error::{HandlerError, HandlerResult};
use crate::handler::AsyncHandler;
use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use oxiri::Iri;
use tracing::debug;

const WEBID_SCHEME: &str = "WebID ";

/// Identity of the agent behind a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// WebID of the agent; `None` for the anonymous agent
    pub web_id: Option<String>,
}

impl Credentials {
    /// The anonymous agent
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Whether the agent presented an identity
    pub fn is_authenticated(&self) -> bool {
        self.web_id.is_some()
    }
}

/// Extracts a WebID from an `Authorization: WebID <iri>` header
///
/// The header is trusted as-is; proving ownership of the WebID is a concern
/// for an authenticating front-end.
pub struct WebIdExtractor;

#[async_trait]
impl AsyncHandler for WebIdExtractor {
    type Input = HeaderMap;
    type Output = Credentials;

    fn can_handle(&self, input: &HeaderMap) -> HandlerResult<()> {
        let authorization = input
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| HandlerError::unsupported("No WebID authorization header."))?;
        if authorization.starts_with(WEBID_SCHEME) {
            Ok(())
        } else {
            Err(HandlerError::unsupported(
                "No WebID authorization header.",
            ))
        }
    }

    async fn handle(&self, input: HeaderMap) -> HandlerResult<Credentials> {
        let authorization = input
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(WEBID_SCHEME))
            .ok_or_else(|| {
                HandlerError::BadRequest("malformed authorization header".to_string())
            })?;
        let web_id = Iri::parse(authorization.trim().to_string())
            .map_err(|e| HandlerError::BadRequest(format!("invalid WebID: {e}")))?;
        debug!(web_id = %web_id, "extracted WebID credentials");
        Ok(Credentials {
            web_id: Some(web_id.into_inner()),
        })
    }
}

/// Fallback strategy yielding the anonymous agent
///
/// Placed last in the extraction chain so that requests without credentials
/// still proceed and authorization decides what the anonymous agent may do.
pub struct AnonymousCredentialsExtractor;

#[async_trait]
impl AsyncHandler for AnonymousCredentialsExtractor {
    type Input = HeaderMap;
    type Output = Credentials;

    fn can_handle(&self, _input: &HeaderMap) -> HandlerResult<()> {
        Ok(())
    }

    async fn handle(&self, _input: HeaderMap) -> HandlerResult<Credentials> {
        Ok(Credentials::anonymous())
    }
}
