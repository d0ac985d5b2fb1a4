//! Row-level authorization for DAG listings in the workflow console.
//!
//! Given the identity behind a request, this crate decides which DAG records
//! that identity may see and narrows a query to match.
//!
//! # Architecture Overview
//!
//! 1. **RoleResolver** maps an [`Identity`] to its roles. Anonymous users get
//!    the configured public role, if any.
//! 2. **PermissionIndex** unions the `(action, resource_class)` grants of those roles.
//! 3. **AccessDecision** answers role and permission checks, including the
//!    "sees every DAG" gate.
//! 4. **ResourceScopeFilter** passes a query through for unrestricted users and
//!    otherwise restricts it to the DAG ids the authorization store reports.
//!
//! The authorization store and configuration are injected as trait objects;
//! nothing here reads global state.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dag_authz::{AuthzConfig, Identity, InMemoryAuthStore, QueryDescription, ResourceScopeFilter, Role};
//!
//! # async fn run() -> dag_authz::Result<()> {
//! let filter = ResourceScopeFilter::new(
//!     Arc::new(InMemoryAuthStore::new()),
//!     Arc::new(AuthzConfig::from_env()?),
//! );
//! let identity = Identity::authenticated("alice", vec![Role::new("team_a")]);
//! let query = filter.scope(&identity, &QueryDescription::select_from("dag")?).await?;
//! println!("{}", query.sql());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod filter;
pub mod permissions;
pub mod query;
pub mod resolver;
pub mod sqlite;
pub mod store;
pub mod types;

pub use config::{AuthzConfig, ConfigProvider};
pub use decision::{AccessDecision, UNRESTRICTED_ROLES};
pub use error::{AuthzError, Result};
pub use filter::ResourceScopeFilter;
pub use permissions::PermissionIndex;
pub use query::{Predicate, QueryDescription};
pub use resolver::RoleResolver;
pub use sqlite::SqliteAuthStore;
pub use store::{AuthorizationStore, InMemoryAuthStore};
pub use types::{
    Identity, PermissionGrant, PermissionSet, ResourceId, ResourceScope, Role, RoleNames,
    ALL_DAGS, CAN_DAG_EDIT, CAN_DAG_READ,
};
