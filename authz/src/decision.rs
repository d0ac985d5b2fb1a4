//! Access decisions for a single request.

use std::collections::BTreeSet;
use tracing::debug;

use crate::error::Result;
use crate::permissions::PermissionIndex;
use crate::resolver::RoleResolver;
use crate::types::{Identity, PermissionSet, Role, RoleNames, ALL_DAGS, CAN_DAG_EDIT, CAN_DAG_READ};

/// Role names that see every DAG regardless of their grants.
pub const UNRESTRICTED_ROLES: [&str; 4] = ["Admin", "Viewer", "Op", "User"];

/// Answers role and permission questions about one identity.
///
/// Roles are resolved once when the decision is built, so several checks cost
/// a single store round trip. A decision belongs to one request and must not be
/// reused after it: role and grant changes are only picked up by building a new one.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    roles: Vec<Role>,
    permissions: PermissionSet,
}

impl AccessDecision {
    /// Resolve `identity`'s roles and permissions.
    pub async fn resolve(resolver: &RoleResolver, identity: &Identity) -> Result<Self> {
        let roles = resolver.resolve(identity).await?;
        debug!(identity = identity.label(), roles = roles.len(), "Resolved roles");
        Ok(Self::from_roles(roles))
    }

    /// Build a decision from already-resolved roles.
    pub fn from_roles(roles: Vec<Role>) -> Self {
        let permissions = PermissionIndex::compute_permissions(&roles);
        Self { roles, permissions }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Whether any resolved role is named in `names`.
    ///
    /// Accepts a single name or a list of names.
    pub fn has_role(&self, names: impl Into<RoleNames>) -> bool {
        let names = names.into();
        self.roles.iter().any(|role| names.contains(&role.name))
    }

    /// Whether `(action, resource_class)` is in the permission set.
    pub fn has_permission(&self, action: &str, resource_class: &str) -> bool {
        self.permissions
            .iter()
            .any(|g| g.action == action && g.resource_class == resource_class)
    }

    /// Every resource class on which `action` is granted.
    pub fn resource_classes_for(&self, action: &str) -> BTreeSet<String> {
        self.permissions
            .iter()
            .filter(|g| g.action == action)
            .map(|g| g.resource_class.clone())
            .collect()
    }

    /// Whether the identity may see every DAG without row-level filtering.
    ///
    /// Granted by any of:
    /// 1. holding one of [`UNRESTRICTED_ROLES`]
    /// 2. `can_dag_read` on `all_dags`
    /// 3. `can_dag_edit` on `all_dags`
    ///
    /// Each path grants on its own; nothing revokes a match.
    // TODO: the role-name path ignores what those roles actually grant, so a
    // reused "User" role name still sees everything. Decide whether to drop it.
    pub fn has_unrestricted_workflow_access(&self) -> bool {
        self.has_role(UNRESTRICTED_ROLES)
            || self.has_permission(CAN_DAG_READ, ALL_DAGS)
            || self.has_permission(CAN_DAG_EDIT, ALL_DAGS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthzConfig;
    use crate::store::InMemoryAuthStore;
    use rstest::rstest;
    use std::sync::Arc;

    fn decision(roles: Vec<Role>) -> AccessDecision {
        AccessDecision::from_roles(roles)
    }

    #[rstest]
    #[case::admin(Role::new("Admin"))]
    #[case::viewer(Role::new("Viewer"))]
    #[case::op(Role::new("Op"))]
    #[case::user(Role::new("User"))]
    #[case::read_all(Role::new("custom").with_grant(CAN_DAG_READ, ALL_DAGS))]
    #[case::edit_all(Role::new("custom").with_grant(CAN_DAG_EDIT, ALL_DAGS))]
    fn test_each_path_grants_unrestricted_access_alone(#[case] role: Role) {
        assert!(decision(vec![role]).has_unrestricted_workflow_access());
    }

    #[rstest]
    #[case::no_roles(vec![])]
    #[case::empty_role(vec![Role::new("team_a")])]
    #[case::per_dag_read(vec![Role::new("team_a").with_grant(CAN_DAG_READ, "dag_a")])]
    #[case::per_dag_edit(vec![Role::new("team_a").with_grant(CAN_DAG_EDIT, "dag_a")])]
    #[case::other_action_on_all(vec![Role::new("lister").with_grant("can_list", ALL_DAGS)])]
    #[case::lowercase_admin(vec![Role::new("admin")])]
    fn test_no_path_no_unrestricted_access(#[case] roles: Vec<Role>) {
        assert!(!decision(roles).has_unrestricted_workflow_access());
    }

    #[test]
    fn test_extra_roles_never_revoke_access() {
        let roles = vec![
            Role::new("team_a").with_grant(CAN_DAG_READ, "dag_a"),
            Role::new("Viewer"),
            Role::new("Empty"),
        ];
        assert!(decision(roles).has_unrestricted_workflow_access());
    }

    #[test]
    fn test_has_role_single_and_list_agree() {
        let admin = decision(vec![Role::new("Admin")]);
        assert_eq!(admin.has_role("Admin"), admin.has_role(["Admin", "Viewer"]));
        assert!(admin.has_role("Admin"));
        assert!(!admin.has_role(["Op", "User"]));
        assert!(!admin.has_role(Vec::<String>::new()));
    }

    #[test]
    fn test_has_permission() {
        let d = decision(vec![Role::new("team_a").with_grant(CAN_DAG_READ, "dag_a")]);
        assert!(d.has_permission(CAN_DAG_READ, "dag_a"));
        assert!(!d.has_permission(CAN_DAG_EDIT, "dag_a"));
        assert!(!d.has_permission(CAN_DAG_READ, "dag_b"));
    }

    #[test]
    fn test_resource_classes_for() {
        let d = decision(vec![
            Role::new("a")
                .with_grant(CAN_DAG_READ, "dag_a")
                .with_grant(CAN_DAG_EDIT, "dag_b"),
            Role::new("b").with_grant(CAN_DAG_READ, "dag_c"),
        ]);

        assert_eq!(
            d.resource_classes_for(CAN_DAG_READ),
            BTreeSet::from(["dag_a".to_string(), "dag_c".to_string()])
        );
        assert!(d.resource_classes_for("can_delete").is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_without_public_role_has_nothing() {
        let resolver = RoleResolver::new(
            Arc::new(InMemoryAuthStore::new()),
            Arc::new(AuthzConfig::default()),
        );
        let d = AccessDecision::resolve(&resolver, &Identity::Anonymous).await.unwrap();

        assert!(d.roles().is_empty());
        assert!(d.permissions().is_empty());
        assert!(!d.has_unrestricted_workflow_access());
    }

    #[tokio::test]
    async fn test_anonymous_public_role_with_read_all() {
        let mut store = InMemoryAuthStore::new();
        store.insert_role(Role::new("Public").with_grant(CAN_DAG_READ, ALL_DAGS));
        let resolver = RoleResolver::new(
            Arc::new(store),
            Arc::new(AuthzConfig::with_public_role("Public")),
        );

        let d = AccessDecision::resolve(&resolver, &Identity::Anonymous).await.unwrap();
        assert!(d.has_unrestricted_workflow_access());
    }
}
