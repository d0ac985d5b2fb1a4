//! Resolves the roles effective for an identity.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ConfigProvider;
use crate::error::Result;
use crate::store::AuthorizationStore;
use crate::types::{Identity, Role};

/// Maps an [`Identity`] to its ordered list of roles.
///
/// Authenticated identities keep the roles they were assigned, in order.
/// Anonymous identities get the configured public role, when one is configured
/// and the store knows it; otherwise they get no roles at all.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn AuthorizationStore>,
    config: Arc<dyn ConfigProvider>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn AuthorizationStore>, config: Arc<dyn ConfigProvider>) -> Self {
        Self { store, config }
    }

    /// Resolve the roles for `identity`.
    ///
    /// A missing or unknown public role yields an empty list. Only a failing
    /// store produces an error.
    pub async fn resolve(&self, identity: &Identity) -> Result<Vec<Role>> {
        match identity {
            Identity::Authenticated { roles, .. } => Ok(roles.clone()),
            Identity::Anonymous => {
                let Some(public_role) = self.config.get_public_role_name() else {
                    debug!("No public role configured, anonymous identity has no roles");
                    return Ok(Vec::new());
                };

                match self.store.find_role_by_name(&public_role).await? {
                    Some(role) => Ok(vec![role]),
                    None => {
                        warn!(role = %public_role, "Configured public role not found in store");
                        Ok(Vec::new())
                    }
                }
            }
        }
    }

    pub fn store(&self) -> &Arc<dyn AuthorizationStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthzConfig;
    use crate::error::AuthzError;
    use crate::store::InMemoryAuthStore;
    use crate::types::{ALL_DAGS, CAN_DAG_READ};

    fn resolver(store: InMemoryAuthStore, config: AuthzConfig) -> RoleResolver {
        RoleResolver::new(Arc::new(store), Arc::new(config))
    }

    fn public_store() -> InMemoryAuthStore {
        let mut store = InMemoryAuthStore::new();
        store.insert_role(Role::new("Public").with_grant(CAN_DAG_READ, ALL_DAGS));
        store
    }

    #[tokio::test]
    async fn test_authenticated_roles_returned_in_order() {
        let resolver = resolver(InMemoryAuthStore::new(), AuthzConfig::default());
        let roles = vec![Role::new("Op"), Role::new("Admin"), Role::new("team_a")];
        let identity = Identity::authenticated("alice", roles.clone());

        assert_eq!(resolver.resolve(&identity).await.unwrap(), roles);
    }

    #[tokio::test]
    async fn test_anonymous_without_public_role() {
        let resolver = resolver(public_store(), AuthzConfig::default());
        assert!(resolver.resolve(&Identity::Anonymous).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_with_public_role() {
        let resolver = resolver(public_store(), AuthzConfig::with_public_role("Public"));
        let roles = resolver.resolve(&Identity::Anonymous).await.unwrap();

        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "Public");
    }

    #[tokio::test]
    async fn test_anonymous_with_unknown_public_role() {
        let resolver = resolver(public_store(), AuthzConfig::with_public_role("Nobody"));
        assert!(resolver.resolve(&Identity::Anonymous).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let resolver = resolver(
            InMemoryAuthStore::unavailable(),
            AuthzConfig::with_public_role("Public"),
        );
        let result = resolver.resolve(&Identity::Anonymous).await;
        assert!(matches!(result, Err(AuthzError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_authenticated_does_not_touch_store() {
        let resolver = resolver(InMemoryAuthStore::unavailable(), AuthzConfig::default());
        let identity = Identity::authenticated("alice", vec![Role::new("User")]);
        assert!(resolver.resolve(&identity).await.is_ok());
    }
}
