//! LDP request model and operation handling
//!
//! The types here flow through the authenticated pipeline: a parsed
//! [`Operation`], the [`Representation`](representation::Representation)
//! model, and the per-method operation handlers executing against a
//! resource store.

pub mod handler;
pub mod operation;
pub mod operations;
pub mod representation;

pub use handler::AuthenticatedLdpHandler;
pub use operation::{Operation, ResponseDescription};
pub use operations::{
    DeleteOperationHandler, GetOperationHandler, PostOperationHandler, PutOperationHandler,
};
