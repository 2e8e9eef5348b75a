//! Resource storage
//!
//! The pipeline consumes storage through the [`ResourceStore`] trait; the
//! backing implementation is expected to serialize conflicting writes per
//! identifier. [`RepresentationConvertingStore`] wraps any store with the
//! content-negotiating conversion layer.

pub mod conversion;
mod converting;
mod memory;

pub use converting::RepresentationConvertingStore;
pub use memory::MemoryResourceStore;

use crate::error::HandlerResult;
use crate::ldp::representation::{
    Representation, RepresentationPreferences, ResourceIdentifier,
};
use async_trait::async_trait;

/// Store of resource representations, keyed by identifier
///
/// Calls are atomic from the pipeline's perspective: a failed call leaves the
/// store unchanged, and conflicting writes to one identifier are serialized
/// by the implementation.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Retrieve the representation of a resource
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> HandlerResult<Representation>;

    /// Create a new resource inside a container, returning its identifier
    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HandlerResult<ResourceIdentifier>;

    /// Create or replace the representation of a resource
    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HandlerResult<()>;

    /// Remove a resource
    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HandlerResult<()>;
}
