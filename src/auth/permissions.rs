//! Required-permission derivation

use crate::error::{HandlerError, HandlerResult};
use crate::handler::AsyncHandler;
use async_trait::async_trait;
use axum::http::Method;
use std::fmt;

/// Set of access modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionSet {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub delete: bool,
    pub control: bool,
}

impl PermissionSet {
    /// Empty set
    pub const fn none() -> Self {
        Self {
            read: false,
            write: false,
            append: false,
            delete: false,
            control: false,
        }
    }

    /// Every mode granted
    pub const fn all() -> Self {
        Self {
            read: true,
            write: true,
            append: true,
            delete: true,
            control: true,
        }
    }

    pub const fn read_only() -> Self {
        let mut set = Self::none();
        set.read = true;
        set
    }

    pub const fn write_only() -> Self {
        let mut set = Self::none();
        set.write = true;
        set
    }

    pub const fn append_only() -> Self {
        let mut set = Self::none();
        set.append = true;
        set
    }

    pub const fn delete_only() -> Self {
        let mut set = Self::none();
        set.delete = true;
        set
    }

    /// Union of two sets
    pub fn union(self, other: Self) -> Self {
        Self {
            read: self.read || other.read,
            write: self.write || other.write,
            append: self.append || other.append,
            delete: self.delete || other.delete,
            control: self.control || other.control,
        }
    }

    /// Whether this set grants every mode the required set asks for
    pub fn covers(&self, required: &Self) -> bool {
        (!required.read || self.read)
            && (!required.write || self.write)
            && (!required.append || self.append)
            && (!required.delete || self.delete)
            && (!required.control || self.control)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modes = Vec::new();
        if self.read {
            modes.push("Read");
        }
        if self.write {
            modes.push("Write");
        }
        if self.append {
            modes.push("Append");
        }
        if self.delete {
            modes.push("Delete");
        }
        if self.control {
            modes.push("Control");
        }
        write!(f, "{{{}}}", modes.join(", "))
    }
}

/// Derives the required access modes from the request method
pub struct MethodPermissionsExtractor;

#[async_trait]
impl AsyncHandler for MethodPermissionsExtractor {
    type Input = Method;
    type Output = PermissionSet;

    fn can_handle(&self, input: &Method) -> HandlerResult<()> {
        match input.as_str() {
            "GET" | "HEAD" | "POST" | "PUT" | "DELETE" => Ok(()),
            method => Err(HandlerError::unsupported(format!(
                "Cannot determine permissions of {method} requests."
            ))),
        }
    }

    async fn handle(&self, input: Method) -> HandlerResult<PermissionSet> {
        match input.as_str() {
            "GET" | "HEAD" => Ok(PermissionSet::read_only()),
            "POST" => Ok(PermissionSet::append_only()),
            "PUT" => Ok(PermissionSet::write_only()),
            "DELETE" => Ok(PermissionSet::delete_only()),
            method => Err(HandlerError::BadRequest(format!(
                "cannot determine permissions of {method} requests"
            ))),
        }
    }
}
