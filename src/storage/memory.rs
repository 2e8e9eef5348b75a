//! In-memory resource store

use super::ResourceStore;
use crate::error::{HandlerError, HandlerResult};
use crate::ldp::representation::{
    Representation, RepresentationData, RepresentationMetadata, RepresentationPreferences,
    ResourceIdentifier, SLUG,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Stored payload plus its metadata
struct StoredResource {
    data: Bytes,
    metadata: RepresentationMetadata,
}

/// Resource store keeping every representation buffered in memory
///
/// Only accepts binary representations; structured payloads have to pass
/// through the conversion layer first. Reads hand out a fresh single-pass
/// stream over the buffered bytes, so re-reading means re-fetching.
#[derive(Default)]
pub struct MemoryResourceStore {
    resources: RwLock<HashMap<String, StoredResource>>,
}

impl MemoryResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    async fn buffer(representation: Representation) -> HandlerResult<StoredResource> {
        if !representation.is_binary() {
            return Err(HandlerError::BadRequest(
                "store only supports binary representations".to_string(),
            ));
        }
        let metadata = representation.metadata;
        let data = representation.data.into_bytes().await?;
        Ok(StoredResource { data, metadata })
    }

    /// Mint a child identifier from the slug metadata or a fresh UUID
    fn child_identifier(
        container: &ResourceIdentifier,
        metadata: &RepresentationMetadata,
    ) -> ResourceIdentifier {
        let mut base = container.path.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let name = metadata
            .first(SLUG)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        ResourceIdentifier::new(format!("{base}{name}"))
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
    ) -> HandlerResult<Representation> {
        let resources = self.resources.read().await;
        let resource = resources
            .get(&identifier.path)
            .ok_or_else(|| HandlerError::NotFound(identifier.path.clone()))?;
        Ok(Representation::new(
            RepresentationData::from_bytes(resource.data.clone()),
            resource.metadata.clone(),
        ))
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HandlerResult<ResourceIdentifier> {
        let identifier = Self::child_identifier(container, &representation.metadata);
        let stored = Self::buffer(representation).await?;
        debug!(identifier = %identifier, "creating resource");
        self.resources
            .write()
            .await
            .insert(identifier.path.clone(), stored);
        Ok(identifier)
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HandlerResult<()> {
        let stored = Self::buffer(representation).await?;
        debug!(identifier = %identifier, "writing resource");
        self.resources
            .write()
            .await
            .insert(identifier.path.clone(), stored);
        Ok(())
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HandlerResult<()> {
        debug!(identifier = %identifier, "deleting resource");
        self.resources
            .write()
            .await
            .remove(&identifier.path)
            .map(|_| ())
            .ok_or_else(|| HandlerError::NotFound(identifier.path.clone()))
    }
}
