//! Row-level scoping of DAG queries.

use std::sync::Arc;
use tracing::{error, info};

use crate::config::ConfigProvider;
use crate::decision::AccessDecision;
use crate::error::Result;
use crate::query::{validate_identifier, QueryDescription};
use crate::resolver::RoleResolver;
use crate::store::AuthorizationStore;
use crate::types::{Identity, ResourceScope};

/// Column holding the DAG id in DAG-backed tables.
pub const DEFAULT_DAG_ID_COLUMN: &str = "dag_id";

/// Narrows DAG queries to what an identity may see.
///
/// # Security Note
/// The filter fails closed: an identity without unrestricted access only sees
/// ids the store reports right now, and an empty report matches no rows. A store
/// failure aborts the scoping call instead of producing a partial scope.
#[derive(Clone)]
pub struct ResourceScopeFilter {
    resolver: RoleResolver,
    column: String,
}

impl ResourceScopeFilter {
    /// Create a filter that restricts on the `dag_id` column.
    pub fn new(store: Arc<dyn AuthorizationStore>, config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            resolver: RoleResolver::new(store, config),
            column: DEFAULT_DAG_ID_COLUMN.to_string(),
        }
    }

    /// Restrict on a different column, e.g. `task_instance.dag_id`.
    pub fn with_column(mut self, column: &str) -> Result<Self> {
        validate_identifier(column)?;
        self.column = column.to_string();
        Ok(self)
    }

    /// Decide how far `identity` may see into the DAG collection.
    pub async fn resolve_scope(&self, identity: &Identity) -> Result<ResourceScope> {
        let decision = AccessDecision::resolve(&self.resolver, identity)
            .await
            .map_err(|e| {
                error!(identity = identity.label(), "Role resolution failed: {}", e);
                e
            })?;

        if decision.has_unrestricted_workflow_access() {
            info!(identity = identity.label(), "DAG scope: unrestricted");
            return Ok(ResourceScope::Unrestricted);
        }

        let allowed = self
            .resolver
            .store()
            .get_accessible_resource_ids(identity, decision.roles())
            .await
            .map_err(|e| {
                error!(identity = identity.label(), "Accessible DAG lookup failed: {}", e);
                e
            })?;

        info!(
            identity = identity.label(),
            allowed = allowed.len(),
            "DAG scope: restricted"
        );
        Ok(ResourceScope::RestrictedTo(allowed))
    }

    /// Narrow `base` to the DAGs `identity` may access.
    ///
    /// Returns `base` unchanged for unrestricted identities. `base` itself is
    /// never modified.
    pub async fn scope(&self, identity: &Identity, base: &QueryDescription) -> Result<QueryDescription> {
        match self.resolve_scope(identity).await? {
            ResourceScope::Unrestricted => Ok(base.clone()),
            ResourceScope::RestrictedTo(allowed) => base.and_member_of(&self.column, &allowed),
        }
    }
}
