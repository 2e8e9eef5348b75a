//! Response writing

use crate::error::{HandlerError, HandlerResult};
use crate::handler::AsyncHandler;
use crate::ldp::operation::ResponseDescription;
use crate::ldp::representation::RepresentationData;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::StatusCode;
use axum::response::Response;
use tracing::warn;

/// Outcome handed to the response writer: the pipeline's result
pub type ResponseOutcome = HandlerResult<ResponseDescription>;

/// Renders a response description, or an error, as protocol output
///
/// Successful operations answer 200 with a `Location` header naming the
/// affected resource. Errors answer their mapped status with a body naming
/// only the error kind; internal detail never reaches the wire. This stage
/// never re-decides an outcome: the status is fixed before writing starts.
pub struct BasicResponseWriter;

impl BasicResponseWriter {
    fn write_description(description: ResponseDescription) -> HandlerResult<Response> {
        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(LOCATION, description.identifier.path.clone());

        let body = match description.body {
            Some(representation) => {
                if let Some(content_type) = representation.metadata.content_type() {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
                match representation.data {
                    RepresentationData::Binary(stream) => Body::from_stream(stream),
                    RepresentationData::Quads(_) => {
                        return Err(HandlerError::Internal(
                            "cannot write a structured payload to the wire".to_string(),
                        ))
                    }
                }
            }
            None => Body::empty(),
        };

        builder
            .body(body)
            .map_err(|e| HandlerError::Internal(e.to_string()))
    }

    fn write_error(error: &HandlerError) -> HandlerResult<Response> {
        Response::builder()
            .status(error.status())
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from(error.kind().to_string()))
            .map_err(|e| HandlerError::Internal(e.to_string()))
    }
}

#[async_trait]
impl AsyncHandler for BasicResponseWriter {
    type Input = ResponseOutcome;
    type Output = Response;

    fn can_handle(&self, input: &ResponseOutcome) -> HandlerResult<()> {
        match input {
            Ok(description) => match &description.body {
                Some(representation) if !representation.is_binary() => Err(
                    HandlerError::unsupported("Only binary bodies can be written."),
                ),
                _ => Ok(()),
            },
            Err(_) => Ok(()),
        }
    }

    async fn handle(&self, input: ResponseOutcome) -> HandlerResult<Response> {
        match input {
            Ok(description) => Self::write_description(description),
            Err(error) => {
                warn!(kind = error.kind(), %error, "request failed");
                Self::write_error(&error)
            }
        }
    }
}
