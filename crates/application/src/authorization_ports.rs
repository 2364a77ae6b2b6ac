use async_trait::async_trait;
use chrono::{DateTime, Utc};
use innkeep_core::{AppResult, UserId};
use innkeep_domain::{UserCustomRole, UserPermission};

/// Read-only persistence port used to aggregate a user's permissions.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists active, unexpired custom-role assignments including each role's
    /// permissions.
    async fn list_active_custom_role_assignments(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserCustomRole>>;

    /// Lists active, unexpired direct permission overrides.
    async fn list_active_user_permissions(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermission>>;
}

/// Cache port for effective permission sets keyed by user.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the cached permission set if present and unexpired.
    async fn get_permissions(&self, user_id: UserId) -> AppResult<Option<Vec<String>>>;

    /// Stores a permission set with ttl.
    async fn set_permissions(
        &self,
        user_id: UserId,
        permissions: Vec<String>,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops the cached set for one user.
    async fn invalidate(&self, user_id: UserId) -> AppResult<()>;

    /// Drops every cached set.
    async fn invalidate_all(&self) -> AppResult<()>;
}
