//! Authorization strategies

use super::credentials::Credentials;
use super::permissions::PermissionSet;
use crate::acl::AclResolver;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::AsyncHandler;
use crate::ldp::representation::ResourceIdentifier;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Input for an authorizer
#[derive(Debug, Clone)]
pub struct AuthorizerArgs {
    /// Identity of the requesting agent
    pub credentials: Credentials,
    /// Target resource
    pub identifier: ResourceIdentifier,
    /// Modes the operation requires
    pub permissions: PermissionSet,
}

/// Authorizer granting every request
///
/// For unsecured deployments and tests.
pub struct AllowAllAuthorizer;

#[async_trait]
impl AsyncHandler for AllowAllAuthorizer {
    type Input = AuthorizerArgs;
    type Output = ();

    fn can_handle(&self, _input: &AuthorizerArgs) -> HandlerResult<()> {
        Ok(())
    }

    async fn handle(&self, input: AuthorizerArgs) -> HandlerResult<()> {
        debug!(identifier = %input.identifier, "granting without authorization checks");
        Ok(())
    }
}

/// Authorizer enforcing Web Access Control documents
///
/// A request is granted when any applicable statement matches the agent and
/// covers every required mode. `acl:Write` implies `acl:Append`. A denied
/// anonymous agent is asked to authenticate; a denied authenticated agent is
/// refused outright. Resolution faults are server errors, never denials.
pub struct WebAclAuthorizer {
    resolver: Arc<dyn AclResolver>,
}

impl WebAclAuthorizer {
    /// Create an authorizer over an ACL resolver
    pub fn new(resolver: Arc<dyn AclResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl AsyncHandler for WebAclAuthorizer {
    type Input = AuthorizerArgs;
    type Output = ();

    fn can_handle(&self, _input: &AuthorizerArgs) -> HandlerResult<()> {
        Ok(())
    }

    async fn handle(&self, input: AuthorizerArgs) -> HandlerResult<()> {
        let entries = self
            .resolver
            .resolve(&input.identifier)
            .await
            .map_err(|error| match error {
                internal @ HandlerError::Internal(_) => internal,
                other => HandlerError::Internal(other.to_string()),
            })?;

        for entry in &entries {
            let mut granted = entry.modes;
            if granted.write {
                granted.append = true;
            }
            if entry.agent.matches(&input.credentials) && granted.covers(&input.permissions) {
                debug!(
                    identifier = %input.identifier,
                    permissions = %input.permissions,
                    "access granted"
                );
                return Ok(());
            }
        }

        if input.credentials.is_authenticated() {
            Err(HandlerError::Forbidden(format!(
                "no authorization grants {} on {}",
                input.permissions, input.identifier
            )))
        } else {
            Err(HandlerError::Authentication(
                "credentials are required to access this resource".to_string(),
            ))
        }
    }
}
