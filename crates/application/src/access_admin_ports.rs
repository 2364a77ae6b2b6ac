use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use innkeep_core::{
    AppResult, CustomRoleId, DepartmentId, OrganizationId, PermissionId, PropertyId, UserId,
};
use innkeep_domain::{
    CustomRole, PermissionDefinition, Role, ScopeFilter, UserCustomRole, UserType,
};

/// User projection needed to administer access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedUser {
    /// User identifier.
    pub user_id: UserId,
    /// Current system role.
    pub role: Role,
    /// Stored user classification.
    pub user_type: UserType,
    /// Home organization.
    pub organization_id: Option<OrganizationId>,
    /// Home property.
    pub property_id: Option<PropertyId>,
    /// Home department.
    pub department_id: Option<DepartmentId>,
}

/// Input payload for assigning a custom role.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignCustomRoleInput {
    /// Receiving user.
    pub user_id: UserId,
    /// Custom role to assign.
    pub custom_role_id: CustomRoleId,
    /// Optional assignment expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Opaque assignment conditions.
    pub conditions: Option<Value>,
    /// Opaque assignment metadata.
    pub metadata: Option<Value>,
}

/// Input payload for a direct permission grant or denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetUserPermissionInput {
    /// Receiving user.
    pub user_id: UserId,
    /// Catalogue permission.
    pub permission_id: PermissionId,
    /// `false` records an explicit denial.
    pub granted: bool,
    /// Optional override expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Number of users holding one system role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCount {
    /// System role.
    pub role: Role,
    /// Users currently holding it.
    pub user_count: u64,
}

/// Per-role user counts and the tenant filter they were counted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleStatistics {
    /// Constraints applied to the count, `None` when unrestricted.
    pub scope_filters: Option<ScopeFilter>,
    /// One entry per system role.
    pub roles: Vec<RoleCount>,
}

/// Repository port for access administration writes and statistics.
#[async_trait]
pub trait AccessAdminRepository: Send + Sync {
    /// Loads the user being administered.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<ManagedUser>>;

    /// Replaces a user's system role and resets the classification to the
    /// role's default.
    async fn update_user_role(&self, user_id: UserId, role: Role) -> AppResult<()>;

    /// Loads a custom role with its permissions.
    async fn find_custom_role(&self, custom_role_id: CustomRoleId) -> AppResult<Option<CustomRole>>;

    /// Loads one catalogue permission.
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionDefinition>>;

    /// Creates the assignment, or reactivates and updates an existing one for
    /// the same user and role.
    async fn upsert_custom_role_assignment(
        &self,
        input: AssignCustomRoleInput,
        assigned_by: UserId,
    ) -> AppResult<UserCustomRole>;

    /// Deactivates an assignment. Returns `false` when none was active.
    async fn deactivate_custom_role_assignment(
        &self,
        user_id: UserId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<bool>;

    /// Creates or replaces a direct permission override.
    async fn upsert_user_permission(&self, input: SetUserPermissionInput) -> AppResult<()>;

    /// Deletes a direct permission override. Returns `false` when none existed.
    async fn delete_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> AppResult<bool>;

    /// Counts users per system role, restricted by every constraint the
    /// filter sets.
    async fn count_users_by_role(
        &self,
        filter: Option<&ScopeFilter>,
    ) -> AppResult<Vec<RoleCount>>;
}
