//! The authorization store: source of truth for roles and accessible DAGs.
//!
//! Stores are injected as `Arc<dyn AuthorizationStore>`; nothing in this crate
//! reaches for a shared global instance.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::error::{AuthzError, Result};
use crate::types::{Identity, PermissionGrant, ResourceId, Role, ALL_DAGS, CAN_DAG_EDIT, CAN_DAG_READ};

/// Read-only view of roles and per-DAG grants.
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Look up a role, with its current grants, by name.
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// The DAG ids the identity may access, as the store sees them right now.
    ///
    /// `roles` are the identity's resolved roles, so an anonymous identity
    /// arrives with its public role already attached. Only their names are
    /// trusted: grants are re-read from the store.
    async fn get_accessible_resource_ids(
        &self,
        identity: &Identity,
        roles: &[Role],
    ) -> Result<BTreeSet<ResourceId>>;
}

/// DAG ids reachable through per-DAG read or edit grants.
///
/// The `all_dags` sentinel is a resource class, not a DAG, and is skipped.
pub(crate) fn dag_ids_from_grants<'a>(
    grants: impl IntoIterator<Item = &'a PermissionGrant>,
) -> BTreeSet<ResourceId> {
    grants
        .into_iter()
        .filter(|g| g.action == CAN_DAG_READ || g.action == CAN_DAG_EDIT)
        .filter(|g| g.resource_class != ALL_DAGS)
        .map(|g| g.resource_class.clone())
        .collect()
}

/// An authorization store held entirely in memory.
///
/// Useful for tests and for deployments that define roles in a seed file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthStore {
    roles: HashMap<String, Role>,
    unavailable: bool,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load roles from a JSON array of `{ "name": ..., "permissions": [...] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let roles: Vec<Role> = serde_json::from_str(json)
            .map_err(|e| AuthzError::InvalidInput(format!("Invalid role seed data: {}", e)))?;

        let mut store = Self::new();
        for role in roles {
            store.insert_role(role);
        }
        Ok(store)
    }

    /// A store whose every lookup fails, as if its backend were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Insert or replace a role.
    pub fn insert_role(&mut self, role: Role) {
        self.roles.insert(role.name.clone(), role);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(AuthzError::StoreUnavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorizationStore for InMemoryAuthStore {
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.ensure_available()?;
        Ok(self.roles.get(name).cloned())
    }

    async fn get_accessible_resource_ids(
        &self,
        identity: &Identity,
        roles: &[Role],
    ) -> Result<BTreeSet<ResourceId>> {
        self.ensure_available()?;

        let ids = dag_ids_from_grants(
            roles
                .iter()
                .filter_map(|role| self.roles.get(&role.name))
                .flat_map(|role| role.permissions.iter()),
        );

        debug!(identity = identity.label(), count = ids.len(), "Resolved accessible DAG ids");
        Ok(ids)
    }
}
