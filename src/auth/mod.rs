//! Authentication and authorization
//!
//! Credentials extraction, required-permission derivation, and the
//! authorizers deciding whether a request may proceed.

pub mod authorizer;
pub mod credentials;
pub mod permissions;

pub use authorizer::{AllowAllAuthorizer, AuthorizerArgs, WebAclAuthorizer};
pub use credentials::{AnonymousCredentialsExtractor, Credentials, WebIdExtractor};
pub use permissions::{MethodPermissionsExtractor, PermissionSet};
