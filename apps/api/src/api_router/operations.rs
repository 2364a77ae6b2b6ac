//! Access declarations for the guarded routes.
//!
//! Role-list declarations go through the legacy path of the gate; the rest
//! are explicit permission requirements.

use innkeep_application::OperationAccess;
use innkeep_core::AppResult;
use innkeep_domain::{PermissionRequirement, Role};

const USER_CONTAINER: &str = "UserController";
const ROLE_CONTAINER: &str = "RoleController";

const USER_ADMIN_ROLES: [Role; 5] = [
    Role::PlatformAdmin,
    Role::OrganizationOwner,
    Role::OrganizationAdmin,
    Role::PropertyManager,
    Role::DepartmentAdmin,
];

pub(super) fn role_statistics() -> AppResult<OperationAccess> {
    Ok(OperationAccess::new(ROLE_CONTAINER, "getStatistics").requires_any(requirements(&[
        "user.read.platform",
        "user.read.organization",
        "user.read.property",
        "user.read.department",
    ])?))
}

pub(super) fn change_user_role() -> OperationAccess {
    OperationAccess::new(USER_CONTAINER, "updateRole").roles(USER_ADMIN_ROLES.to_vec())
}

pub(super) fn assign_custom_role() -> OperationAccess {
    OperationAccess::new(USER_CONTAINER, "addCustomRole").roles(USER_ADMIN_ROLES.to_vec())
}

pub(super) fn revoke_custom_role() -> OperationAccess {
    OperationAccess::new(USER_CONTAINER, "removeCustomRole").roles(USER_ADMIN_ROLES.to_vec())
}

pub(super) fn set_user_permission() -> AppResult<OperationAccess> {
    Ok(OperationAccess::new(USER_CONTAINER, "updatePermission")
        .requires_any(user_update_requirements()?))
}

pub(super) fn remove_user_permission() -> AppResult<OperationAccess> {
    Ok(OperationAccess::new(USER_CONTAINER, "deletePermission")
        .requires_any(user_update_requirements()?))
}

fn user_update_requirements() -> AppResult<Vec<PermissionRequirement>> {
    requirements(&[
        "user.update.platform",
        "user.update.organization",
        "user.update.property",
        "user.update.department",
    ])
}

fn requirements(values: &[&str]) -> AppResult<Vec<PermissionRequirement>> {
    values
        .iter()
        .map(|value| PermissionRequirement::parse(value))
        .collect()
}
