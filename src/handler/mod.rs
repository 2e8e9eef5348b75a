//! Capability-dispatch handler abstraction
//!
//! Every pluggable stage of the server implements [`AsyncHandler`]: a pure
//! `can_handle` predicate deciding whether this strategy applies to an input,
//! and an async `handle` that consumes the input and produces the output.
//! Interchangeable strategies are composed with [`CompositeHandler`].

mod composite;

pub use composite::CompositeHandler;

use crate::error::HandlerResult;
use async_trait::async_trait;

/// A strategy that can decide whether it applies to an input before running
///
/// `can_handle` must not mutate the input or produce side effects; it rejects
/// with an `UnsupportedError` carrying a diagnostic reason. `handle` takes
/// ownership of the input and is only meaningful after `can_handle` accepted;
/// calling it on unsupported input must fail rather than produce wrong output.
#[async_trait]
pub trait AsyncHandler: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Check whether this handler supports the given input
    fn can_handle(&self, input: &Self::Input) -> HandlerResult<()>;

    /// Process the input
    async fn handle(&self, input: Self::Input) -> HandlerResult<Self::Output>;

    /// Check support, then process exactly once
    async fn handle_safe(&self, input: Self::Input) -> HandlerResult<Self::Output> {
        self.can_handle(&input)?;
        self.handle(input).await
    }
}
