//! Per-method operation handlers
//!
//! One handler per request method, composed into the pipeline's operation
//! dispatcher. Each declines any other method so the dispatcher can surface
//! an unsupported method as such.

use super::operation::{Operation, ResponseDescription};
use crate::error::{HandlerError, HandlerResult};
use crate::handler::AsyncHandler;
use crate::ldp::representation::Representation;
use crate::storage::ResourceStore;
use async_trait::async_trait;
use axum::http::Method;
use std::sync::Arc;

fn require_method(operation: &Operation, method: Method) -> HandlerResult<()> {
    if operation.method == method {
        Ok(())
    } else {
        Err(HandlerError::unsupported(format!(
            "Only {method} operations are supported."
        )))
    }
}

fn require_body(operation: Operation) -> HandlerResult<(Operation, Representation)> {
    match operation.body {
        Some(body) => Ok((
            Operation {
                body: None,
                ..operation
            },
            body,
        )),
        None => Err(HandlerError::BadRequest(
            "a body is required for this request".to_string(),
        )),
    }
}

/// Retrieves the representation of the target resource
pub struct GetOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl GetOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AsyncHandler for GetOperationHandler {
    type Input = Operation;
    type Output = ResponseDescription;

    fn can_handle(&self, input: &Operation) -> HandlerResult<()> {
        require_method(input, Method::GET)
    }

    async fn handle(&self, input: Operation) -> HandlerResult<ResponseDescription> {
        let representation = self
            .store
            .get_representation(&input.target, &input.preferences)
            .await?;
        Ok(ResponseDescription::with_body(input.target, representation))
    }
}

/// Creates a new resource inside the target container
pub struct PostOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl PostOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AsyncHandler for PostOperationHandler {
    type Input = Operation;
    type Output = ResponseDescription;

    fn can_handle(&self, input: &Operation) -> HandlerResult<()> {
        require_method(input, Method::POST)
    }

    async fn handle(&self, input: Operation) -> HandlerResult<ResponseDescription> {
        let (operation, body) = require_body(input)?;
        let identifier = self.store.add_resource(&operation.target, body).await?;
        Ok(ResponseDescription::empty(identifier))
    }
}

/// Creates or replaces the target resource
pub struct PutOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl PutOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AsyncHandler for PutOperationHandler {
    type Input = Operation;
    type Output = ResponseDescription;

    fn can_handle(&self, input: &Operation) -> HandlerResult<()> {
        require_method(input, Method::PUT)
    }

    async fn handle(&self, input: Operation) -> HandlerResult<ResponseDescription> {
        let (operation, body) = require_body(input)?;
        self.store.set_representation(&operation.target, body).await?;
        Ok(ResponseDescription::empty(operation.target))
    }
}

/// Deletes the target resource
pub struct DeleteOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl DeleteOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AsyncHandler for DeleteOperationHandler {
    type Input = Operation;
    type Output = ResponseDescription;

    fn can_handle(&self, input: &Operation) -> HandlerResult<()> {
        require_method(input, Method::DELETE)
    }

    async fn handle(&self, input: Operation) -> HandlerResult<ResponseDescription> {
        self.store.delete_resource(&input.target).await?;
        Ok(ResponseDescription::empty(input.target))
    }
}
