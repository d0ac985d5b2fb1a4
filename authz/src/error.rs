//! Error types for the authorization system.
//!
//! # Security Note
//! Error messages must not reveal which resources exist or what a role grants.
//! A failed store lookup is surfaced as a request failure, never as an empty
//! scope, so an outage cannot be mistaken for legitimate zero access.

use thiserror::Error;

/// Errors that can occur while resolving roles or scoping a query.
///
/// A missing public role is not represented here: it degrades to an empty
/// role set instead.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The authorization store could not answer a lookup.
    ///
    /// Fatal for the current request. Callers must not fall back to either
    /// "allow all" or "deny all".
    #[error("Authorization store unavailable: {0}")]
    StoreUnavailable(String),

    /// An argument was rejected before reaching the decision logic.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A configuration source exists but could not be read.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<sqlx::Error> for AuthzError {
    fn from(err: sqlx::Error) -> Self {
        AuthzError::StoreUnavailable(err.to_string())
    }
}

/// A specialized Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;
