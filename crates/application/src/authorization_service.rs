use std::sync::Arc;

use innkeep_core::{AppError, AppResult, UserId};
use innkeep_domain::{AuthenticatedUser, ScopeFilter};

use crate::PermissionResolver;

mod conditions;
mod evaluation;
mod narrowing;
mod roles;

pub use narrowing::{DepartmentAdminPropertyReadOnly, ScopeNarrowingRule};

/// Outcome of one authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDecision {
    /// Whether access is allowed.
    pub granted: bool,
    /// Diagnostic reason, set on denial.
    pub reason: Option<String>,
    /// Tenant constraints the caller must apply to its data query.
    /// `None` on a grant means unrestricted.
    pub scope_filters: Option<ScopeFilter>,
}

impl PermissionDecision {
    /// Creates a granted decision.
    #[must_use]
    pub fn granted(scope_filters: Option<ScopeFilter>) -> Self {
        Self {
            granted: true,
            reason: None,
            scope_filters,
        }
    }

    /// Creates a denied decision.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            granted: false,
            reason: Some(reason.into()),
            scope_filters: None,
        }
    }

    /// Converts the decision into scope filters or a forbidden error.
    pub fn into_result(self) -> AppResult<Option<ScopeFilter>> {
        if self.granted {
            return Ok(self.scope_filters);
        }

        Err(AppError::Forbidden(
            self.reason
                .unwrap_or_else(|| "permission denied".to_owned()),
        ))
    }
}

/// Application service evaluating permission requirements against a request
/// context.
#[derive(Clone)]
pub struct AuthorizationService {
    resolver: PermissionResolver,
    narrowing_rules: Arc<[Arc<dyn ScopeNarrowingRule>]>,
}

impl AuthorizationService {
    /// Creates a service with the default narrowing rules.
    #[must_use]
    pub fn new(resolver: PermissionResolver) -> Self {
        Self::with_narrowing_rules(resolver, narrowing::default_rules())
    }

    /// Creates a service with an explicit set of narrowing rules.
    #[must_use]
    pub fn with_narrowing_rules(
        resolver: PermissionResolver,
        narrowing_rules: Vec<Arc<dyn ScopeNarrowingRule>>,
    ) -> Self {
        Self {
            resolver,
            narrowing_rules: narrowing_rules.into(),
        }
    }

    /// Returns the user's effective permission strings.
    pub async fn effective_permissions(&self, user: &AuthenticatedUser) -> Vec<String> {
        self.resolver.effective_permissions(user).await
    }

    /// Drops the cached permission set for a user.
    pub async fn clear_cache(&self, user_id: UserId) -> AppResult<()> {
        self.resolver.clear_cache(user_id).await
    }
}

#[cfg(test)]
mod tests;
