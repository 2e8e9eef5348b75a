//! Error taxonomy shared by the handler pipeline
//!
//! Every pluggable stage reports failures through [`HandlerError`] so the
//! response writer can map each failure class to exactly one protocol status.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors produced by handlers and dispatchers
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A single handler declined the input
    #[error("{reason}")]
    Unsupported {
        /// Human-readable rejection reason
        reason: String,
    },

    /// No member of a composite dispatcher accepted the input
    #[error("{}", format_aggregated(.0))]
    Aggregated(Vec<String>),

    /// A composite dispatcher found no eligible member to execute
    #[error("All handlers failed.")]
    AllHandlersFailed,

    /// Malformed request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication required and absent
    #[error("Authentication required: {0}")]
    Authentication(String),

    /// Authorization denied
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// No operation handler supports the request method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No converter accepts the representation
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// IO failure while consuming a payload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unclassified backend error
    #[error("Server error: {0}")]
    Internal(String),
}

pub type HandlerResult<T> = Result<T, HandlerError>;

fn format_aggregated(reasons: &[String]) -> String {
    if reasons.is_empty() {
        "No handlers registered.".to_string()
    } else {
        format!("[{}]", reasons.join(", "))
    }
}

impl HandlerError {
    /// Shorthand for an [`HandlerError::Unsupported`] rejection
    pub fn unsupported(reason: impl Into<String>) -> Self {
        HandlerError::Unsupported {
            reason: reason.into(),
        }
    }

    /// Stable name identifying the error class
    ///
    /// This is the only error detail ever serialized into a response body.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Unsupported { .. } => "UnsupportedError",
            HandlerError::Aggregated(_) => "AggregatedUnsupportedError",
            HandlerError::AllHandlersFailed => "AllHandlersFailedError",
            HandlerError::BadRequest(_) => "BadRequestError",
            HandlerError::Authentication(_) => "AuthenticationError",
            HandlerError::Forbidden(_) => "ForbiddenError",
            HandlerError::NotFound(_) => "NotFoundError",
            HandlerError::MethodNotAllowed => "MethodNotAllowedError",
            HandlerError::Conversion(_) => "ConversionError",
            HandlerError::Io(_) | HandlerError::Internal(_) => "ServerError",
        }
    }

    /// Protocol status code for this error class
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Unsupported { .. }
            | HandlerError::Aggregated(_)
            | HandlerError::BadRequest(_)
            | HandlerError::Conversion(_) => StatusCode::BAD_REQUEST,
            HandlerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            HandlerError::Forbidden(_) => StatusCode::FORBIDDEN,
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HandlerError::AllHandlersFailed
            | HandlerError::Io(_)
            | HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregated_display() {
        let err = HandlerError::Aggregated(vec![
            "Not supported.".to_string(),
            "Not supported.".to_string(),
        ]);
        assert_eq!(err.to_string(), "[Not supported., Not supported.]");
    }

    #[test]
    fn test_aggregated_empty_display() {
        let err = HandlerError::Aggregated(Vec::new());
        assert_eq!(err.to_string(), "No handlers registered.");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            HandlerError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HandlerError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            HandlerError::Authentication("anonymous".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HandlerError::AllHandlersFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(HandlerError::NotFound("x".into()).kind(), "NotFoundError");
        assert_eq!(
            HandlerError::unsupported("nope").kind(),
            "UnsupportedError"
        );
        assert_eq!(
            HandlerError::Internal("backend".into()).kind(),
            "ServerError"
        );
    }
}
