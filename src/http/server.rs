//! HTTP server hosting the pipeline

use super::request::HttpRequest;
use crate::error::HandlerError;
use crate::handler::AsyncHandler;
use crate::ldp::handler::AuthenticatedLdpHandler;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures::stream::StreamExt;
use std::io;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Serves every path through the authenticated LDP pipeline
pub struct LdpServer {
    handler: Arc<AuthenticatedLdpHandler>,
    address: String,
    port: u16,
}

impl LdpServer {
    /// Create a server around a fully wired pipeline
    pub fn new(
        handler: Arc<AuthenticatedLdpHandler>,
        address: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            handler,
            address: address.into(),
            port,
        }
    }

    /// Router dispatching every request into the pipeline
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(ldp_route)
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.handler))
    }

    /// Start serving
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = format!("{}:{}", self.address, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("LDP server listening on http://{addr}");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Adapt an incoming request into the pipeline's input and run it
async fn ldp_route(
    State(handler): State<Arc<AuthenticatedLdpHandler>>,
    request: axum::extract::Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(|e| io::Error::new(io::ErrorKind::Other, e)))
        .boxed();

    let http_request = HttpRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        headers: parts.headers,
        body: Some(body),
    };

    match handler.handle_safe(http_request).await {
        Ok(response) => response,
        Err(error) => {
            // The decided outcome could not be written; nothing left but 500.
            error!(kind = error.kind(), %error, "failed to write response");
            (StatusCode::INTERNAL_SERVER_ERROR, HandlerError::kind(&error)).into_response()
        }
    }
}
