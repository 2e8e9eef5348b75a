//! Turtle converters for the internal quad form
//!
//! Both directions go through `rio_turtle`; conversion is lazy, so the
//! payload is only drained once something downstream consumes the new
//! representation's data.

use super::{check_request, ConverterArgs, INTERNAL_QUADS, TEXT_TURTLE};
use crate::error::HandlerResult;
use crate::handler::AsyncHandler;
use crate::ldp::representation::{Representation, RepresentationData};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use oxiri::Iri;
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};
use std::io;

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

/// Failure while mapping parser output into the internal model
struct ConversionFault(String);

impl From<oxrdf::IriParseError> for ConversionFault {
    fn from(error: oxrdf::IriParseError) -> Self {
        ConversionFault(error.to_string())
    }
}

impl std::fmt::Display for ConversionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts `internal/quads` to `text/turtle`
pub struct QuadToTurtleConverter;

#[async_trait]
impl AsyncHandler for QuadToTurtleConverter {
    type Input = ConverterArgs;
    type Output = Representation;

    fn can_handle(&self, input: &ConverterArgs) -> HandlerResult<()> {
        check_request(input, &[INTERNAL_QUADS], &[TEXT_TURTLE])
    }

    async fn handle(&self, input: ConverterArgs) -> HandlerResult<Representation> {
        let metadata = input.representation.metadata.derive(TEXT_TURTLE);
        let data = match input.representation.data {
            RepresentationData::Quads(quads) => quads,
            RepresentationData::Binary(_) => {
                return Err(crate::error::HandlerError::Internal(
                    "quad converter received a binary payload".to_string(),
                ))
            }
        };
        let serialized = stream::once(async move {
            let quads = collect_quads(data).await?;
            format_turtle(&quads).map(Bytes::from)
        })
        .boxed();
        Ok(Representation::new(
            RepresentationData::Binary(serialized),
            metadata,
        ))
    }
}

/// Converts `text/turtle` to `internal/quads`
pub struct TurtleToQuadConverter;

#[async_trait]
impl AsyncHandler for TurtleToQuadConverter {
    type Input = ConverterArgs;
    type Output = Representation;

    fn can_handle(&self, input: &ConverterArgs) -> HandlerResult<()> {
        check_request(input, &[TEXT_TURTLE], &[INTERNAL_QUADS])
    }

    async fn handle(&self, input: ConverterArgs) -> HandlerResult<Representation> {
        let metadata = input.representation.metadata.derive(INTERNAL_QUADS);
        let base = input.identifier.path.clone();
        let data = match input.representation.data {
            RepresentationData::Binary(bytes) => bytes,
            RepresentationData::Quads(_) => {
                return Err(crate::error::HandlerError::Internal(
                    "turtle converter received a quad payload".to_string(),
                ))
            }
        };
        let parsed = stream::once(async move {
            let buffered = collect_bytes(data).await?;
            parse_turtle(&buffered, &base)
        })
        .map(|result| match result {
            Ok(quads) => stream::iter(quads.into_iter().map(Ok)).boxed(),
            Err(error) => stream::once(async move { Err(error) }).boxed(),
        })
        .flatten()
        .boxed();
        Ok(Representation::new(
            RepresentationData::Quads(parsed),
            metadata,
        ))
    }
}

async fn collect_quads(mut data: BoxStream<'static, io::Result<Quad>>) -> io::Result<Vec<Quad>> {
    let mut quads = Vec::new();
    while let Some(quad) = data.next().await {
        quads.push(quad?);
    }
    Ok(quads)
}

async fn collect_bytes(mut data: BoxStream<'static, io::Result<Bytes>>) -> io::Result<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = data.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer.freeze())
}

/// Serialize quads as Turtle, dropping the graph component
fn format_turtle(quads: &[Quad]) -> io::Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut formatter = TurtleFormatter::new(&mut output);

    for quad in quads {
        let s_node;
        let s_blank;
        let subject = match &quad.subject {
            Subject::NamedNode(n) => {
                s_node = rio_api::model::NamedNode { iri: n.as_str() };
                rio_api::model::Subject::NamedNode(s_node)
            }
            Subject::BlankNode(b) => {
                s_blank = rio_api::model::BlankNode { id: b.as_str() };
                rio_api::model::Subject::BlankNode(s_blank)
            }
            #[allow(unreachable_patterns)]
            _ => return Err(invalid_data("unsupported subject term")),
        };

        let p_node = rio_api::model::NamedNode {
            iri: quad.predicate.as_str(),
        };

        let o_node;
        let o_blank;
        let o_datatype;
        let object = match &quad.object {
            Term::NamedNode(n) => {
                o_node = rio_api::model::NamedNode { iri: n.as_str() };
                rio_api::model::Term::NamedNode(o_node)
            }
            Term::BlankNode(b) => {
                o_blank = rio_api::model::BlankNode { id: b.as_str() };
                rio_api::model::Term::BlankNode(o_blank)
            }
            Term::Literal(l) => {
                if let Some(language) = l.language() {
                    rio_api::model::Term::Literal(rio_api::model::Literal::LanguageTaggedString {
                        value: l.value(),
                        language,
                    })
                } else {
                    let datatype = l.datatype();
                    if datatype.as_str() == "http://www.w3.org/2001/XMLSchema#string" {
                        rio_api::model::Term::Literal(rio_api::model::Literal::Simple {
                            value: l.value(),
                        })
                    } else {
                        o_datatype = rio_api::model::NamedNode {
                            iri: datatype.as_str(),
                        };
                        rio_api::model::Term::Literal(rio_api::model::Literal::Typed {
                            value: l.value(),
                            datatype: o_datatype,
                        })
                    }
                }
            }
            #[allow(unreachable_patterns)]
            _ => return Err(invalid_data("unsupported object term")),
        };

        let triple = rio_api::model::Triple {
            subject,
            predicate: p_node,
            object,
        };
        formatter
            .format(&triple)
            .map_err(|e| invalid_data(e.to_string()))?;
    }

    formatter.finish().map_err(|e| invalid_data(e.to_string()))?;
    Ok(output)
}

/// Parse a Turtle document into quads in the default graph
fn parse_turtle(input: &[u8], base: &str) -> io::Result<Vec<Quad>> {
    let base_iri = Iri::parse(base.to_string()).ok();
    let mut parser = TurtleParser::new(input, base_iri);

    let mut quads = Vec::new();
    let result: Result<(), rio_turtle::TurtleError> = parser.parse_all(&mut |t| {
        let subject = convert_subject(t.subject)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let object = convert_term(t.object)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let predicate = NamedNode::new(t.predicate.iri)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        quads.push(Quad::new(subject, predicate, object, GraphName::DefaultGraph));
        Ok(())
    });

    match result {
        Ok(()) => Ok(quads),
        Err(e) => Err(invalid_data(e.to_string())),
    }
}

fn convert_subject(subject: rio_api::model::Subject<'_>) -> Result<Subject, ConversionFault> {
    match subject {
        rio_api::model::Subject::NamedNode(n) => Ok(Subject::NamedNode(NamedNode::new(n.iri)?)),
        rio_api::model::Subject::BlankNode(b) => {
            Ok(Subject::BlankNode(BlankNode::new_unchecked(b.id)))
        }
        #[allow(unreachable_patterns)]
        _ => Err(ConversionFault("unsupported subject term".to_string())),
    }
}

fn convert_term(term: rio_api::model::Term<'_>) -> Result<Term, ConversionFault> {
    match term {
        rio_api::model::Term::NamedNode(n) => Ok(Term::NamedNode(NamedNode::new(n.iri)?)),
        rio_api::model::Term::BlankNode(b) => Ok(Term::BlankNode(BlankNode::new_unchecked(b.id))),
        rio_api::model::Term::Literal(l) => Ok(Term::Literal(convert_literal(l)?)),
        #[allow(unreachable_patterns)]
        _ => Err(ConversionFault("unsupported object term".to_string())),
    }
}

fn convert_literal(literal: rio_api::model::Literal<'_>) -> Result<Literal, ConversionFault> {
    match literal {
        rio_api::model::Literal::Simple { value } => Ok(Literal::new_simple_literal(value)),
        rio_api::model::Literal::LanguageTaggedString { value, language } => {
            Ok(Literal::new_language_tagged_literal_unchecked(
                value,
                language.to_lowercase(),
            ))
        }
        rio_api::model::Literal::Typed { value, datatype } => Ok(Literal::new_typed_literal(
            value,
            NamedNode::new(datatype.iri)?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldp::representation::{
        RepresentationMetadata, RepresentationPreferences, ResourceIdentifier,
    };

    fn quad(s: &str, p: &str, o: &str) -> Quad {
        Quad::new(
            Subject::NamedNode(NamedNode::new(s).unwrap()),
            NamedNode::new(p).unwrap(),
            Term::NamedNode(NamedNode::new(o).unwrap()),
            GraphName::DefaultGraph,
        )
    }

    fn quad_args(quads: Vec<Quad>, preferences: RepresentationPreferences) -> ConverterArgs {
        ConverterArgs {
            identifier: ResourceIdentifier::new("http://test.com/resource"),
            representation: Representation::new(
                RepresentationData::from_quads(quads),
                RepresentationMetadata::with_content_type(INTERNAL_QUADS),
            ),
            preferences,
        }
    }

    #[tokio::test]
    async fn test_can_handle_quad_to_turtle() {
        let converter = QuadToTurtleConverter;
        let args = quad_args(
            Vec::new(),
            RepresentationPreferences::content_type_only(TEXT_TURTLE),
        );
        assert!(converter.can_handle(&args).is_ok());
    }

    #[tokio::test]
    async fn test_can_handle_rejects_other_input_types() {
        let converter = QuadToTurtleConverter;
        let args = ConverterArgs {
            identifier: ResourceIdentifier::new("http://test.com/resource"),
            representation: Representation::new(
                RepresentationData::from_bytes(""),
                RepresentationMetadata::with_content_type("application/json"),
            ),
            preferences: RepresentationPreferences::content_type_only(TEXT_TURTLE),
        };
        assert!(converter.can_handle(&args).is_err());
    }

    #[tokio::test]
    async fn test_converts_quads_to_turtle() {
        let converter = QuadToTurtleConverter;
        let args = quad_args(
            vec![quad(
                "http://test.com/s",
                "http://test.com/p",
                "http://test.com/o",
            )],
            RepresentationPreferences::content_type_only(TEXT_TURTLE),
        );

        let result = converter.handle_safe(args).await.unwrap();
        assert!(result.is_binary());
        assert_eq!(result.metadata.content_type(), Some(TEXT_TURTLE));

        let bytes = result.data.into_bytes().await.unwrap();
        let turtle = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(turtle.contains("<http://test.com/s> <http://test.com/p> <http://test.com/o>"));
    }

    #[tokio::test]
    async fn test_parses_turtle_to_quads() {
        let converter = TurtleToQuadConverter;
        let args = ConverterArgs {
            identifier: ResourceIdentifier::new("http://test.com/resource"),
            representation: Representation::new(
                RepresentationData::from_bytes(
                    "<http://test.com/s> <http://test.com/p> <http://test.com/o> .",
                ),
                RepresentationMetadata::with_content_type(TEXT_TURTLE),
            ),
            preferences: RepresentationPreferences::content_type_only(INTERNAL_QUADS),
        };

        let result = converter.handle_safe(args).await.unwrap();
        assert!(!result.is_binary());
        assert_eq!(result.metadata.content_type(), Some(INTERNAL_QUADS));

        let quads = result.data.into_quads().await.unwrap();
        assert_eq!(
            quads,
            vec![quad(
                "http://test.com/s",
                "http://test.com/p",
                "http://test.com/o"
            )]
        );
    }

    #[tokio::test]
    async fn test_parses_relative_iris_against_the_resource() {
        let converter = TurtleToQuadConverter;
        let args = ConverterArgs {
            identifier: ResourceIdentifier::new("http://test.com/resource"),
            representation: Representation::new(
                RepresentationData::from_bytes("<#it> <http://test.com/p> <http://test.com/o> ."),
                RepresentationMetadata::with_content_type(TEXT_TURTLE),
            ),
            preferences: RepresentationPreferences::content_type_only(INTERNAL_QUADS),
        };

        let quads = converter
            .handle_safe(args)
            .await
            .unwrap()
            .data
            .into_quads()
            .await
            .unwrap();
        assert_eq!(
            quads[0].subject,
            Subject::NamedNode(NamedNode::new("http://test.com/resource#it").unwrap())
        );
    }

    #[tokio::test]
    async fn test_parse_error_surfaces_on_consumption() {
        let converter = TurtleToQuadConverter;
        let args = ConverterArgs {
            identifier: ResourceIdentifier::new("http://test.com/resource"),
            representation: Representation::new(
                RepresentationData::from_bytes("this is not turtle"),
                RepresentationMetadata::with_content_type(TEXT_TURTLE),
            ),
            preferences: RepresentationPreferences::content_type_only(INTERNAL_QUADS),
        };

        let result = converter.handle_safe(args).await.unwrap();
        assert!(result.data.into_quads().await.is_err());
    }
}
