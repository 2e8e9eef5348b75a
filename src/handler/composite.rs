//! Composite dispatcher over an ordered list of handlers

use super::AsyncHandler;
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;

/// Combines an ordered sequence of handlers sharing one input/output shape
///
/// Dispatch is asymmetric on purpose: `can_handle` succeeds on the first
/// accepting member and aggregates every rejection reason on total failure,
/// while `handle` commits to the first eligible member and surfaces that
/// member's own failure without trying siblings. `handle_safe` selects the
/// member once and calls its `handle` exactly once.
pub struct CompositeHandler<I, O> {
    handlers: Vec<Box<dyn AsyncHandler<Input = I, Output = O>>>,
}

impl<I: Send + 'static, O: Send + 'static> CompositeHandler<I, O> {
    /// Create a dispatcher from an ordered list of handlers
    pub fn new(handlers: Vec<Box<dyn AsyncHandler<Input = I, Output = O>>>) -> Self {
        Self { handlers }
    }

    /// Number of member handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the dispatcher has no members
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Find the first member that accepts the input
    ///
    /// On total failure the rejection reasons are aggregated in member order.
    fn find_handler(&self, input: &I) -> HandlerResult<&dyn AsyncHandler<Input = I, Output = O>> {
        let mut reasons = Vec::with_capacity(self.handlers.len());
        for handler in &self.handlers {
            match handler.can_handle(input) {
                Ok(()) => return Ok(handler.as_ref()),
                Err(error) => reasons.push(error.to_string()),
            }
        }
        Err(HandlerError::Aggregated(reasons))
    }
}

#[async_trait]
impl<I, O> AsyncHandler for CompositeHandler<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    fn can_handle(&self, input: &I) -> HandlerResult<()> {
        self.find_handler(input).map(|_| ())
    }

    async fn handle(&self, input: I) -> HandlerResult<O> {
        let handler = self
            .find_handler(&input)
            .map_err(|_| HandlerError::AllHandlersFailed)?;
        handler.handle(input).await
    }

    async fn handle_safe(&self, input: I) -> HandlerResult<O> {
        let handler = self.find_handler(&input)?;
        handler.handle(input).await
    }
}
