//! SQLite-backed authorization store.
//!
//! Read-only: roles and grants are owned and written by the role-management
//! side of the console. The store expects two tables:
//!
//! - `ab_role (id INTEGER PRIMARY KEY, name TEXT UNIQUE)`
//! - `ab_permission_grant (role_id INTEGER, action TEXT, resource_class TEXT)`

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use tracing::{debug, error};

use crate::error::{AuthzError, Result};
use crate::store::AuthorizationStore;
use crate::types::{Identity, PermissionGrant, ResourceId, Role, ALL_DAGS, CAN_DAG_EDIT, CAN_DAG_READ};

/// Authorization store reading roles and grants from SQLite.
#[derive(Debug, Clone)]
pub struct SqliteAuthStore {
    pool: SqlitePool,
}

impl SqliteAuthStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AuthorizationStore for SqliteAuthStore {
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let role_id: Option<i64> = sqlx::query_scalar("SELECT id FROM ab_role WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Role lookup failed: {}", e);
                AuthzError::from(e)
            })?;

        let Some(role_id) = role_id else {
            return Ok(None);
        };

        let grants: Vec<(String, String)> = sqlx::query_as(
            "SELECT action, resource_class FROM ab_permission_grant WHERE role_id = ? ORDER BY action, resource_class",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Grant lookup failed: {}", e);
            AuthzError::from(e)
        })?;

        Ok(Some(Role {
            name: name.to_string(),
            permissions: grants
                .into_iter()
                .map(|(action, resource_class)| PermissionGrant::new(action, resource_class))
                .collect(),
        }))
    }

    async fn get_accessible_resource_ids(
        &self,
        identity: &Identity,
        roles: &[Role],
    ) -> Result<BTreeSet<ResourceId>> {
        if roles.is_empty() {
            return Ok(BTreeSet::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT DISTINCT g.resource_class FROM ab_permission_grant g \
             JOIN ab_role r ON r.id = g.role_id WHERE g.action IN (",
        );
        query.push_bind(CAN_DAG_READ);
        query.push(", ");
        query.push_bind(CAN_DAG_EDIT);
        query.push(") AND g.resource_class != ");
        query.push_bind(ALL_DAGS);
        query.push(" AND r.name IN (");
        let mut names = query.separated(", ");
        for role in roles {
            names.push_bind(role.name.as_str());
        }
        names.push_unseparated(")");

        let rows: Vec<(String,)> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Accessible DAG lookup failed: {}", e);
                AuthzError::from(e)
            })?;

        debug!(identity = identity.label(), count = rows.len(), "Resolved accessible DAG ids");
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
