//! Permission set computation.

use tracing::debug;

use crate::types::{PermissionSet, Role};

/// Computes the union of grants across a collection of roles.
pub struct PermissionIndex;

impl PermissionIndex {
    /// Every `(action, resource_class)` pair granted by any of `roles`.
    ///
    /// Duplicate grants collapse; role order does not matter.
    pub fn compute_permissions(roles: &[Role]) -> PermissionSet {
        let permissions: PermissionSet = roles
            .iter()
            .flat_map(|role| role.permissions.iter().cloned())
            .collect();

        debug!(
            roles = roles.len(),
            permissions = permissions.len(),
            "Computed permission set"
        );
        permissions
    }
}
