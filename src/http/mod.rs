//! HTTP transport adaptation
//!
//! Translates between the wire and the pipeline: an incoming request becomes
//! an [`HttpRequest`], the request parser turns it into an operation, and
//! the response writer renders the outcome back as protocol output. The
//! axum server in [`server`] hosts the pipeline.

pub mod parser;
pub mod request;
pub mod server;
pub mod writer;

pub use parser::{AcceptPreferenceParser, BasicRequestParser, RawBodyParser, TargetExtractor};
pub use request::HttpRequest;
pub use server::LdpServer;
pub use writer::BasicResponseWriter;
