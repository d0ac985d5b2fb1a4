//! Configuration for anonymous access.
//!
//! The only setting this crate reads is the name of the role granted to
//! anonymous users (`AUTH_ROLE_PUBLIC`). Leaving it unset is valid: anonymous
//! users then resolve to no roles and see nothing.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::debug;

use crate::error::{AuthzError, Result};

/// Environment variable naming the public role.
pub const PUBLIC_ROLE_ENV: &str = "AUTH_ROLE_PUBLIC";

/// Source of authorization-related configuration.
pub trait ConfigProvider: Send + Sync {
    /// The configured name of the role granted to anonymous users, if any.
    fn get_public_role_name(&self) -> Option<String>;
}

/// Authorization settings, usually loaded from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Role granted to anonymous users
    #[serde(default)]
    pub public_role: Option<String>,
}

impl AuthzConfig {
    /// Load configuration from the process environment, after applying a
    /// `.env` file if one is present.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AuthzError::Configuration(format!(
                    "Failed to read .env file: {}",
                    e
                )));
            }
        }

        let public_role = env::var(PUBLIC_ROLE_ENV).ok();
        debug!(configured = public_role.is_some(), "Loaded public role setting");
        Ok(Self { public_role })
    }

    pub fn with_public_role(name: impl Into<String>) -> Self {
        Self {
            public_role: Some(name.into()),
        }
    }
}

impl ConfigProvider for AuthzConfig {
    fn get_public_role_name(&self) -> Option<String> {
        self.public_role
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
