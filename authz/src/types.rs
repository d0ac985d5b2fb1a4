//! Core authorization types for DAG row-level filtering.
//!
//! # Security Considerations
//!
//! - An [`Identity`] is established by the authentication layer and handed to
//!   this crate read-only. Nothing here trusts identity data from any other source.
//! - A [`PermissionSet`] is computed per request and discarded afterwards, so a
//!   role or grant change takes effect on the very next request.
//! - A [`ResourceScope::RestrictedTo`] set is only ever built from what the
//!   authorization store reported. An empty set means no access.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Permission that allows reading a DAG.
pub const CAN_DAG_READ: &str = "can_dag_read";

/// Permission that allows editing a DAG.
pub const CAN_DAG_EDIT: &str = "can_dag_edit";

/// Sentinel resource class covering every DAG.
pub const ALL_DAGS: &str = "all_dags";

/// Identifier of a protected workflow resource (a DAG id).
pub type ResourceId = String;

/// Deduplicated set of permission grants held through a collection of roles.
pub type PermissionSet = BTreeSet<PermissionGrant>;

/// An (action, resource class) pair, e.g. `(can_dag_read, all_dags)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// The permission name (e.g., "can_dag_read")
    pub action: String,

    /// The resource class the permission applies to (e.g., "all_dags" or a DAG id)
    pub resource_class: String,
}

impl PermissionGrant {
    pub fn new(action: impl Into<String>, resource_class: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource_class: resource_class.into(),
        }
    }
}

/// A named bundle of permission grants, owned by the authorization store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,

    #[serde(default)]
    pub permissions: Vec<PermissionGrant>,
}

impl Role {
    /// Creates a role with no grants.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    /// Adds a grant to the role, builder style.
    pub fn with_grant(mut self, action: impl Into<String>, resource_class: impl Into<String>) -> Self {
        self.permissions
            .push(PermissionGrant::new(action, resource_class));
        self
    }
}

/// The identity of the user behind the current request.
///
/// # Security Note
/// Anonymous identities carry no roles of their own. Their roles come from the
/// configured public role, resolved by [`crate::resolver::RoleResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    Anonymous,
    Authenticated {
        user_id: String,
        /// Roles in the order they were assigned
        roles: Vec<Role>,
    },
}

impl Identity {
    pub fn authenticated(user_id: impl Into<String>, roles: Vec<Role>) -> Self {
        Identity::Authenticated {
            user_id: user_id.into(),
            roles,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// Short label used in audit logs. Never includes role details.
    pub fn label(&self) -> &str {
        match self {
            Identity::Anonymous => "anonymous",
            Identity::Authenticated { user_id, .. } => user_id,
        }
    }
}

/// One or more role names to match against, normalized to a list.
///
/// A single name converts to a one-element list, so `has_role("Admin")` and
/// `has_role(["Admin"])` are the same query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleNames(Vec<String>);

impl RoleNames {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for RoleNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for RoleNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for RoleNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for RoleNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RoleNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Outcome of scoping: everything, or an explicit allow-list of DAG ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceScope {
    Unrestricted,
    RestrictedTo(BTreeSet<ResourceId>),
}

impl ResourceScope {
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ResourceScope::Unrestricted)
    }

    /// Whether a single resource id falls inside this scope.
    pub fn permits(&self, id: &str) -> bool {
        match self {
            ResourceScope::Unrestricted => true,
            ResourceScope::RestrictedTo(ids) => ids.contains(id),
        }
    }
}
