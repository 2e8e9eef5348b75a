//! Store wrapper performing content negotiation

use super::conversion::{type_weight, BoxedConverter, ConverterArgs, ConverterChain};
use super::ResourceStore;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::{AsyncHandler, CompositeHandler};
use crate::ldp::representation::{
    Representation, RepresentationPreferences, ResourceIdentifier,
};
use async_trait::async_trait;
use tracing::debug;

/// Wraps a backing store and converts representations on the way in and out
///
/// Reads negotiate against the caller's preferences: when the stored content
/// type already satisfies them the representation passes through untouched,
/// otherwise the converter chain runs once. Writes are normalized to the
/// store's canonical content type when one is configured.
pub struct RepresentationConvertingStore<T> {
    source: T,
    converter: ConverterChain,
    in_type: Option<String>,
}

impl<T: ResourceStore> RepresentationConvertingStore<T> {
    /// Wrap a store with a converter chain
    ///
    /// `in_type` is the canonical content type inbound representations are
    /// converted to before they reach the backing store; `None` accepts
    /// anything as-is.
    pub fn new(source: T, converters: Vec<BoxedConverter>, in_type: Option<String>) -> Self {
        Self {
            source,
            converter: CompositeHandler::new(converters),
            in_type,
        }
    }

    /// Convert an inbound representation to the canonical content type
    async fn convert_inbound(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HandlerResult<Representation> {
        let Some(in_type) = &self.in_type else {
            return Ok(representation);
        };
        if representation.metadata.content_type() == Some(in_type.as_str()) {
            return Ok(representation);
        }
        let content_type = representation
            .metadata
            .content_type()
            .unwrap_or("unknown")
            .to_string();
        debug!(identifier = %identifier, from = %content_type, to = %in_type, "converting inbound representation");
        self.converter
            .handle_safe(ConverterArgs {
                identifier: identifier.clone(),
                representation,
                preferences: RepresentationPreferences::content_type_only(in_type.clone()),
            })
            .await
            .map_err(|error| match error {
                HandlerError::Unsupported { .. } | HandlerError::Aggregated(_) => {
                    HandlerError::Conversion(format!(
                        "no converter accepts {content_type} as input for {in_type}"
                    ))
                }
                other => other,
            })
    }
}

#[async_trait]
impl<T: ResourceStore> ResourceStore for RepresentationConvertingStore<T> {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> HandlerResult<Representation> {
        let representation = self.source.get_representation(identifier, preferences).await?;
        let satisfied = representation
            .metadata
            .content_type()
            .map_or(false, |content_type| {
                type_weight(content_type, &preferences.content_type) > 0.0
            });
        if satisfied {
            return Ok(representation);
        }
        debug!(identifier = %identifier, "negotiating stored representation");
        self.converter
            .handle_safe(ConverterArgs {
                identifier: identifier.clone(),
                representation,
                preferences: preferences.clone(),
            })
            .await
            .map_err(|error| match error {
                HandlerError::Unsupported { .. } | HandlerError::Aggregated(_) => {
                    HandlerError::Conversion(format!(
                        "no converter can satisfy the requested types for {identifier}"
                    ))
                }
                other => other,
            })
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HandlerResult<ResourceIdentifier> {
        let representation = self.convert_inbound(container, representation).await?;
        self.source.add_resource(container, representation).await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HandlerResult<()> {
        let representation = self.convert_inbound(identifier, representation).await?;
        self.source.set_representation(identifier, representation).await
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HandlerResult<()> {
        self.source.delete_resource(identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldp::representation::{RepresentationData, RepresentationMetadata};
    use crate::storage::conversion::{
        QuadToTurtleConverter, TurtleToQuadConverter, INTERNAL_QUADS, TEXT_TURTLE,
    };
    use crate::storage::MemoryResourceStore;
    use oxrdf::{GraphName, NamedNode, Quad, Subject, Term};

    fn converting_store() -> RepresentationConvertingStore<MemoryResourceStore> {
        RepresentationConvertingStore::new(
            MemoryResourceStore::new(),
            vec![
                Box::new(QuadToTurtleConverter) as BoxedConverter,
                Box::new(TurtleToQuadConverter),
            ],
            Some(TEXT_TURTLE.to_string()),
        )
    }

    fn turtle(content: &str) -> Representation {
        Representation::new(
            RepresentationData::from_bytes(content.to_string()),
            RepresentationMetadata::with_content_type(TEXT_TURTLE),
        )
    }

    #[tokio::test]
    async fn test_get_converts_to_requested_type() {
        let store = converting_store();
        let id = ResourceIdentifier::new("http://test.com/doc");
        store
            .set_representation(
                &id,
                turtle("<http://test.com/s> <http://test.com/p> <http://test.com/o> ."),
            )
            .await
            .unwrap();

        let representation = store
            .get_representation(
                &id,
                &RepresentationPreferences::content_type_only(INTERNAL_QUADS),
            )
            .await
            .unwrap();
        assert_eq!(representation.metadata.content_type(), Some(INTERNAL_QUADS));

        let quads = representation.data.into_quads().await.unwrap();
        assert_eq!(
            quads,
            vec![Quad::new(
                Subject::NamedNode(NamedNode::new("http://test.com/s").unwrap()),
                NamedNode::new("http://test.com/p").unwrap(),
                Term::NamedNode(NamedNode::new("http://test.com/o").unwrap()),
                GraphName::DefaultGraph,
            )]
        );
    }

    #[tokio::test]
    async fn test_get_passes_through_when_preferences_satisfied() {
        let store = converting_store();
        let id = ResourceIdentifier::new("http://test.com/doc");
        store.set_representation(&id, turtle("")).await.unwrap();

        let representation = store
            .get_representation(
                &id,
                &RepresentationPreferences::content_type_only("text/*"),
            )
            .await
            .unwrap();
        assert_eq!(representation.metadata.content_type(), Some(TEXT_TURTLE));
    }

    #[tokio::test]
    async fn test_get_without_preferences_passes_through() {
        let store = converting_store();
        let id = ResourceIdentifier::new("http://test.com/doc");
        store.set_representation(&id, turtle("")).await.unwrap();

        let representation = store
            .get_representation(&id, &RepresentationPreferences::default())
            .await
            .unwrap();
        assert_eq!(representation.metadata.content_type(), Some(TEXT_TURTLE));
    }

    #[tokio::test]
    async fn test_write_converts_structured_payloads() {
        let store = converting_store();
        let id = ResourceIdentifier::new("http://test.com/doc");
        let quads = Representation::new(
            RepresentationData::from_quads(vec![Quad::new(
                Subject::NamedNode(NamedNode::new("http://test.com/s").unwrap()),
                NamedNode::new("http://test.com/p").unwrap(),
                Term::NamedNode(NamedNode::new("http://test.com/o").unwrap()),
                GraphName::DefaultGraph,
            )]),
            RepresentationMetadata::with_content_type(INTERNAL_QUADS),
        );

        store.set_representation(&id, quads).await.unwrap();

        let stored = store
            .get_representation(&id, &RepresentationPreferences::default())
            .await
            .unwrap();
        assert_eq!(stored.metadata.content_type(), Some(TEXT_TURTLE));
        let bytes = stored.data.into_bytes().await.unwrap();
        assert!(String::from_utf8(bytes.to_vec())
            .unwrap()
            .contains("<http://test.com/s>"));
    }

    #[tokio::test]
    async fn test_write_rejects_unconvertible_types() {
        let store = converting_store();
        let id = ResourceIdentifier::new("http://test.com/doc");
        let json = Representation::new(
            RepresentationData::from_bytes("{}"),
            RepresentationMetadata::with_content_type("application/json"),
        );

        let error = store.set_representation(&id, json).await.unwrap_err();
        assert!(matches!(error, HandlerError::Conversion(_)));
    }
}
