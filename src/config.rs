//! Server configuration and component wiring
//!
//! All strategy selection happens here, once, at process start: which
//! converters populate the chain, which extractors feed authentication, and
//! which authorizer guards execution. The pipeline itself carries no ambient
//! wiring.

use crate::acl::{AclManager, StoreAclResolver};
use crate::auth::authorizer::{AllowAllAuthorizer, WebAclAuthorizer};
use crate::auth::credentials::{AnonymousCredentialsExtractor, Credentials, WebIdExtractor};
use crate::auth::permissions::{MethodPermissionsExtractor, PermissionSet};
use crate::error::HandlerResult;
use crate::handler::{AsyncHandler, CompositeHandler};
use crate::http::parser::BasicRequestParser;
use crate::http::request::HttpRequest;
use crate::http::writer::BasicResponseWriter;
use crate::ldp::handler::{AuthenticatedLdpHandler, AuthenticatedLdpHandlerArgs};
use crate::ldp::operation::{Operation, ResponseDescription};
use crate::ldp::operations::{
    DeleteOperationHandler, GetOperationHandler, PostOperationHandler, PutOperationHandler,
};
use crate::ldp::representation::{
    Representation, RepresentationData, RepresentationMetadata, ResourceIdentifier,
};
use crate::storage::conversion::{
    BoxedConverter, QuadToTurtleConverter, TurtleToQuadConverter, TEXT_TURTLE,
};
use crate::storage::ResourceStore;
use axum::http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
    /// Public base URL, ending in a slash
    pub base: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
            base: "http://localhost:3000/".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read(path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Base container identifier
    pub fn base_identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.base.clone())
    }
}

/// Converters for the canonical quad form, in chain order
pub fn rdf_converters() -> Vec<BoxedConverter> {
    vec![
        Box::new(QuadToTurtleConverter) as BoxedConverter,
        Box::new(TurtleToQuadConverter),
    ]
}

/// Operation dispatcher over the per-method handlers
pub fn operation_dispatcher(
    store: Arc<dyn ResourceStore>,
) -> CompositeHandler<Operation, ResponseDescription> {
    CompositeHandler::new(vec![
        Box::new(GetOperationHandler::new(Arc::clone(&store)))
            as Box<dyn AsyncHandler<Input = Operation, Output = ResponseDescription>>,
        Box::new(PostOperationHandler::new(Arc::clone(&store))),
        Box::new(PutOperationHandler::new(Arc::clone(&store))),
        Box::new(DeleteOperationHandler::new(store)),
    ])
}

/// Credential extraction chain: WebID with an anonymous fallback
pub fn credentials_chain() -> CompositeHandler<HeaderMap, Credentials> {
    CompositeHandler::new(vec![
        Box::new(WebIdExtractor) as Box<dyn AsyncHandler<Input = HeaderMap, Output = Credentials>>,
        Box::new(AnonymousCredentialsExtractor),
    ])
}

/// Permission derivation chain
pub fn permissions_chain() -> CompositeHandler<Method, PermissionSet> {
    CompositeHandler::new(vec![Box::new(MethodPermissionsExtractor)
        as Box<dyn AsyncHandler<Input = Method, Output = PermissionSet>>])
}

/// Request parser chain
pub fn request_parser_chain() -> CompositeHandler<HttpRequest, Operation> {
    CompositeHandler::new(vec![Box::new(BasicRequestParser::new())
        as Box<dyn AsyncHandler<Input = HttpRequest, Output = Operation>>])
}

/// Pipeline without authorization checks
pub fn unsecured_handler(store: Arc<dyn ResourceStore>) -> AuthenticatedLdpHandler {
    AuthenticatedLdpHandler::new(AuthenticatedLdpHandlerArgs {
        request_parser: Box::new(request_parser_chain()),
        credentials_extractor: Box::new(credentials_chain()),
        permissions_extractor: Box::new(permissions_chain()),
        authorizer: Box::new(AllowAllAuthorizer),
        operation_handler: Box::new(operation_dispatcher(store)),
        response_writer: Box::new(BasicResponseWriter),
    })
}

/// Pipeline enforcing Web Access Control against the given store
pub fn web_acl_handler(store: Arc<dyn ResourceStore>) -> AuthenticatedLdpHandler {
    let resolver = Arc::new(StoreAclResolver::new(Arc::clone(&store)));
    AuthenticatedLdpHandler::new(AuthenticatedLdpHandlerArgs {
        request_parser: Box::new(request_parser_chain()),
        credentials_extractor: Box::new(credentials_chain()),
        permissions_extractor: Box::new(permissions_chain()),
        authorizer: Box::new(WebAclAuthorizer::new(resolver)),
        operation_handler: Box::new(operation_dispatcher(store)),
        response_writer: Box::new(BasicResponseWriter),
    })
}

/// Seed the root ACL so the base container starts out fully accessible
///
/// Grants every mode to every agent on the base container and everything
/// under it, the expected starting point before real policies are uploaded.
pub async fn initialize_root_acl(
    store: &dyn ResourceStore,
    base: &ResourceIdentifier,
) -> HandlerResult<()> {
    let document = format!(
        r#"@prefix   acl:  <http://www.w3.org/ns/auth/acl#>.
@prefix  foaf:  <http://xmlns.com/foaf/0.1/>.

<#authorization>
    a               acl:Authorization;
    acl:agentClass  foaf:Agent;
    acl:mode        acl:Read;
    acl:mode        acl:Write;
    acl:mode        acl:Append;
    acl:mode        acl:Delete;
    acl:mode        acl:Control;
    acl:accessTo    <{base}>;
    acl:default     <{base}>."#
    );

    let acl_identifier = AclManager.acl_identifier(base);
    info!(acl = %acl_identifier, "seeding root ACL");
    store
        .set_representation(
            &acl_identifier,
            Representation::new(
                RepresentationData::from_bytes(document),
                RepresentationMetadata::with_content_type(TEXT_TURTLE),
            ),
        )
        .await
}
