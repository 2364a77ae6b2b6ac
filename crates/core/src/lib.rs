//! Shared primitives for all Rust crates in Innkeep.

#![forbid(unsafe_code)]

/// Typed identifiers for tenants and users.
pub mod identifiers;

use thiserror::Error;

pub use identifiers::{
    CustomRoleId, DepartmentId, OrganizationId, PermissionId, PropertyId, UserId,
};

/// Result type used across Innkeep crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No authenticated user is present where one is required.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
