//! Portico Linked Data Platform server
//!
//! A resource server in the Linked-Data-Platform style: resources are
//! addressed by identifier, manipulated through uniform read/write/delete
//! operations, and served in whichever representation format the client and
//! the converter chain agree on.
//!
//! # Architecture
//!
//! Every pluggable piece of the server implements one contract,
//! [`handler::AsyncHandler`]: decide whether an input is supported, then
//! process it. Interchangeable strategies are composed in ordered lists with
//! [`handler::CompositeHandler`], which is the only carrier of polymorphism
//! in the codebase. On top of that sit:
//!
//! - the representation model ([`ldp::representation`]) with lazy,
//!   single-pass payloads,
//! - format converters and the content-negotiating store wrapper
//!   ([`storage`]),
//! - credentials, permissions and Web Access Control ([`auth`], [`acl`]),
//! - the authenticated request pipeline ([`ldp::handler`]) and its HTTP
//!   hosting ([`http`]).
//!
//! Wiring of concrete strategies happens once at bootstrap in [`config`].
//!
//! ## Example Usage
//!
//! ```no_run
//! use portico::config::{rdf_converters, unsecured_handler};
//! use portico::http::LdpServer;
//! use portico::storage::conversion::TEXT_TURTLE;
//! use portico::storage::{MemoryResourceStore, RepresentationConvertingStore, ResourceStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn ResourceStore> = Arc::new(RepresentationConvertingStore::new(
//!     MemoryResourceStore::new(),
//!     rdf_converters(),
//!     Some(TEXT_TURTLE.to_string()),
//! ));
//! let handler = Arc::new(unsecured_handler(store));
//! LdpServer::new(handler, "127.0.0.1", 3000).start().await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod acl;
pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod ldp;
pub mod storage;

// Re-export main types for convenience
pub use error::{HandlerError, HandlerResult};

pub use handler::{AsyncHandler, CompositeHandler};

pub use ldp::{
    AuthenticatedLdpHandler, DeleteOperationHandler, GetOperationHandler, Operation,
    PostOperationHandler, PutOperationHandler, ResponseDescription,
};

pub use ldp::representation::{
    Preference, Representation, RepresentationData, RepresentationMetadata,
    RepresentationPreferences, ResourceIdentifier,
};

pub use auth::{
    AllowAllAuthorizer, AnonymousCredentialsExtractor, Credentials, MethodPermissionsExtractor,
    PermissionSet, WebAclAuthorizer, WebIdExtractor,
};

pub use acl::{AclEntry, AclManager, AclResolver, AgentMatcher, StoreAclResolver};

pub use storage::{MemoryResourceStore, RepresentationConvertingStore, ResourceStore};

pub use http::{BasicRequestParser, BasicResponseWriter, HttpRequest, LdpServer};

pub use config::ServerConfig;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
