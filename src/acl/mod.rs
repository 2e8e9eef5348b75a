//! Web Access Control
//!
//! ACL documents are stored as regular resources next to the resources they
//! govern. The resolver reads them through the store as quads, walking up
//! the container hierarchy when a resource has no ACL of its own; inherited
//! documents only contribute entries flagged `acl:default`.

use crate::auth::credentials::Credentials;
use crate::auth::permissions::PermissionSet;
use crate::error::{HandlerError, HandlerResult};
use crate::ldp::representation::{RepresentationPreferences, ResourceIdentifier};
use crate::storage::conversion::INTERNAL_QUADS;
use crate::storage::ResourceStore;
use async_trait::async_trait;
use oxrdf::{Quad, Term};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// `acl:` vocabulary
pub mod vocabulary {
    pub const ACL_READ: &str = "http://www.w3.org/ns/auth/acl#Read";
    pub const ACL_WRITE: &str = "http://www.w3.org/ns/auth/acl#Write";
    pub const ACL_APPEND: &str = "http://www.w3.org/ns/auth/acl#Append";
    pub const ACL_DELETE: &str = "http://www.w3.org/ns/auth/acl#Delete";
    pub const ACL_CONTROL: &str = "http://www.w3.org/ns/auth/acl#Control";

    pub const ACL_MODE: &str = "http://www.w3.org/ns/auth/acl#mode";
    pub const ACL_AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
    pub const ACL_AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";
    pub const ACL_ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
    pub const ACL_DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";

    pub const ACL_AUTHENTICATED_AGENT: &str =
        "http://www.w3.org/ns/auth/acl#AuthenticatedAgent";
    pub const FOAF_AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
}

use vocabulary::*;

/// Who an authorization statement applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentMatcher {
    /// A specific agent, by WebID
    Agent(String),
    /// A class of agents, by IRI
    AgentClass(String),
}

impl AgentMatcher {
    /// Whether the given credentials fall under this matcher
    pub fn matches(&self, credentials: &Credentials) -> bool {
        match self {
            AgentMatcher::Agent(web_id) => credentials.web_id.as_deref() == Some(web_id),
            AgentMatcher::AgentClass(class) => match class.as_str() {
                FOAF_AGENT => true,
                ACL_AUTHENTICATED_AGENT => credentials.is_authenticated(),
                _ => false,
            },
        }
    }
}

/// One authorization statement from an ACL document
#[derive(Debug, Clone)]
pub struct AclEntry {
    /// Agent or agent class the statement grants to
    pub agent: AgentMatcher,
    /// Granted modes
    pub modes: PermissionSet,
    /// Resource the statement names as its target
    pub access_to: Option<String>,
    /// Whether the statement is inherited by descendants
    pub is_default: bool,
}

/// Maps resources to the ACL documents governing them
#[derive(Debug, Clone, Copy, Default)]
pub struct AclManager;

impl AclManager {
    /// ACL document identifier for a resource
    pub fn acl_identifier(&self, identifier: &ResourceIdentifier) -> ResourceIdentifier {
        ResourceIdentifier::new(format!("{}.acl", identifier.path))
    }

    /// Whether an identifier denotes an ACL document
    pub fn is_acl_identifier(&self, identifier: &ResourceIdentifier) -> bool {
        identifier.path.ends_with(".acl")
    }
}

/// Resolves the authorization statements applicable to a resource
#[async_trait]
pub trait AclResolver: Send + Sync {
    /// Statements governing the resource, after inheritance filtering
    async fn resolve(&self, identifier: &ResourceIdentifier) -> HandlerResult<Vec<AclEntry>>;
}

/// Resolver reading ACL documents from a resource store
///
/// The store must be able to produce `internal/quads`, so in practice this
/// wraps the converting store.
pub struct StoreAclResolver {
    store: Arc<dyn ResourceStore>,
    manager: AclManager,
}

impl StoreAclResolver {
    /// Create a resolver over a quad-capable store
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            manager: AclManager,
        }
    }
}

#[async_trait]
impl AclResolver for StoreAclResolver {
    async fn resolve(&self, identifier: &ResourceIdentifier) -> HandlerResult<Vec<AclEntry>> {
        let preferences = RepresentationPreferences::content_type_only(INTERNAL_QUADS);
        let mut current = identifier.clone();
        let mut inherited = false;

        loop {
            let acl_identifier = self.manager.acl_identifier(&current);
            match self
                .store
                .get_representation(&acl_identifier, &preferences)
                .await
            {
                Ok(representation) => {
                    let quads = representation.data.into_quads().await.map_err(|error| {
                        HandlerError::Internal(format!(
                            "malformed ACL document {acl_identifier}: {error}"
                        ))
                    })?;
                    let entries = parse_entries(&quads);
                    debug!(
                        resource = %identifier,
                        acl = %acl_identifier,
                        inherited,
                        count = entries.len(),
                        "resolved ACL document"
                    );
                    return Ok(if inherited {
                        entries.into_iter().filter(|entry| entry.is_default).collect()
                    } else {
                        entries
                    });
                }
                Err(HandlerError::NotFound(_)) => match current.parent() {
                    Some(parent) => {
                        current = parent;
                        inherited = true;
                    }
                    None => return Ok(Vec::new()),
                },
                Err(error) => {
                    return Err(HandlerError::Internal(format!(
                        "cannot read ACL document {acl_identifier}: {error}"
                    )))
                }
            }
        }
    }
}

/// Group quads into authorization statements, one per subject and agent
fn parse_entries(quads: &[Quad]) -> Vec<AclEntry> {
    #[derive(Default)]
    struct Statement {
        agents: Vec<AgentMatcher>,
        modes: PermissionSet,
        access_to: Option<String>,
        is_default: bool,
    }

    let mut statements: HashMap<String, Statement> = HashMap::new();

    for quad in quads {
        let statement = statements.entry(quad.subject.to_string()).or_default();
        let object_iri = match &quad.object {
            Term::NamedNode(node) => Some(node.as_str()),
            _ => None,
        };
        match quad.predicate.as_str() {
            ACL_MODE => {
                if let Some(mode) = object_iri {
                    match mode {
                        ACL_READ => statement.modes.read = true,
                        ACL_WRITE => statement.modes.write = true,
                        ACL_APPEND => statement.modes.append = true,
                        ACL_DELETE => statement.modes.delete = true,
                        ACL_CONTROL => statement.modes.control = true,
                        _ => {}
                    }
                }
            }
            ACL_AGENT => {
                if let Some(agent) = object_iri {
                    statement.agents.push(AgentMatcher::Agent(agent.to_string()));
                }
            }
            ACL_AGENT_CLASS => {
                if let Some(class) = object_iri {
                    statement
                        .agents
                        .push(AgentMatcher::AgentClass(class.to_string()));
                }
            }
            ACL_ACCESS_TO => {
                statement.access_to = object_iri.map(str::to_string);
            }
            ACL_DEFAULT => {
                statement.is_default = true;
            }
            _ => {}
        }
    }

    statements
        .into_values()
        .flat_map(|statement| {
            let modes = statement.modes;
            let access_to = statement.access_to;
            let is_default = statement.is_default;
            statement.agents.into_iter().map(move |agent| AclEntry {
                agent,
                modes,
                access_to: access_to.clone(),
                is_default,
            })
        })
        .collect()
}
