//! Authenticated request pipeline

use super::operation::{Operation, ResponseDescription};
use crate::auth::authorizer::AuthorizerArgs;
use crate::auth::credentials::Credentials;
use crate::auth::permissions::PermissionSet;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::AsyncHandler;
use crate::http::request::HttpRequest;
use crate::http::writer::ResponseOutcome;
use async_trait::async_trait;
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use tracing::debug;

/// Pluggable stages of the pipeline
///
/// Each field is typically a composite dispatcher over one or more concrete
/// strategies; wiring happens once at bootstrap and is passed down here.
pub struct AuthenticatedLdpHandlerArgs {
    pub request_parser: Box<dyn AsyncHandler<Input = HttpRequest, Output = Operation>>,
    pub credentials_extractor: Box<dyn AsyncHandler<Input = HeaderMap, Output = Credentials>>,
    pub permissions_extractor: Box<dyn AsyncHandler<Input = Method, Output = PermissionSet>>,
    pub authorizer: Box<dyn AsyncHandler<Input = AuthorizerArgs, Output = ()>>,
    pub operation_handler: Box<dyn AsyncHandler<Input = Operation, Output = ResponseDescription>>,
    pub response_writer: Box<dyn AsyncHandler<Input = ResponseOutcome, Output = Response>>,
}

/// Sequences parsing, authentication, authorization, execution and response
/// writing for one request
///
/// Stages run strictly in order and never retry; the first failing stage
/// short-circuits into an error response. Each stage failure maps to exactly
/// one status class: parse faults are bad requests, failed credential
/// extraction asks for authentication, an unrecognized method is a bad
/// request, denial is forbidden, and a method no operation handler accepts
/// answers method-not-allowed.
pub struct AuthenticatedLdpHandler {
    request_parser: Box<dyn AsyncHandler<Input = HttpRequest, Output = Operation>>,
    credentials_extractor: Box<dyn AsyncHandler<Input = HeaderMap, Output = Credentials>>,
    permissions_extractor: Box<dyn AsyncHandler<Input = Method, Output = PermissionSet>>,
    authorizer: Box<dyn AsyncHandler<Input = AuthorizerArgs, Output = ()>>,
    operation_handler: Box<dyn AsyncHandler<Input = Operation, Output = ResponseDescription>>,
    response_writer: Box<dyn AsyncHandler<Input = ResponseOutcome, Output = Response>>,
}

impl AuthenticatedLdpHandler {
    /// Assemble the pipeline from its stages
    pub fn new(args: AuthenticatedLdpHandlerArgs) -> Self {
        Self {
            request_parser: args.request_parser,
            credentials_extractor: args.credentials_extractor,
            permissions_extractor: args.permissions_extractor,
            authorizer: args.authorizer,
            operation_handler: args.operation_handler,
            response_writer: args.response_writer,
        }
    }

    /// Run the stages up to execution
    async fn run(&self, request: HttpRequest) -> HandlerResult<ResponseDescription> {
        let headers = request.headers.clone();

        let operation = self
            .request_parser
            .handle_safe(request)
            .await
            .map_err(|error| match error {
                bad @ HandlerError::BadRequest(_) => bad,
                other => HandlerError::BadRequest(other.to_string()),
            })?;
        debug!(method = %operation.method, target = %operation.target, "parsed request");

        let credentials = self
            .credentials_extractor
            .handle_safe(headers)
            .await
            .map_err(|error| match error {
                bad @ HandlerError::BadRequest(_) => bad,
                other => HandlerError::Authentication(other.to_string()),
            })?;
        debug!(authenticated = credentials.is_authenticated(), "extracted credentials");

        let permissions = self
            .permissions_extractor
            .handle_safe(operation.method.clone())
            .await
            .map_err(|error| HandlerError::BadRequest(error.to_string()))?;
        debug!(permissions = %permissions, "determined required permissions");

        self.authorizer
            .handle_safe(AuthorizerArgs {
                credentials,
                identifier: operation.target.clone(),
                permissions,
            })
            .await?;

        self.operation_handler
            .handle_safe(operation)
            .await
            .map_err(|error| match error {
                HandlerError::Aggregated(_) | HandlerError::AllHandlersFailed => {
                    HandlerError::MethodNotAllowed
                }
                other => other,
            })
    }
}

#[async_trait]
impl AsyncHandler for AuthenticatedLdpHandler {
    type Input = HttpRequest;
    type Output = Response;

    fn can_handle(&self, input: &HttpRequest) -> HandlerResult<()> {
        self.request_parser.can_handle(input)
    }

    async fn handle(&self, input: HttpRequest) -> HandlerResult<Response> {
        let outcome = self.run(input).await;
        self.response_writer.handle_safe(outcome).await
    }
}
