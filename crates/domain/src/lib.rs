//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod condition;
mod context;
mod permission;
mod role;
mod scope;
mod user;

pub use assignment::{
    CustomRole, CustomRolePermission, PermissionDefinition, UserCustomRole, UserPermission,
};
pub use condition::{CustomCondition, PermissionConditions};
pub use context::{PermissionContext, ScopeFilter};
pub use permission::{
    GrantedPermission, PermissionKey, PermissionRequirement, RequirementInput, WILDCARD,
    is_well_formed, normalize_requirement, permission_matches,
};
pub use role::{Role, RoleInfo, UNKNOWN_ROLE_INFO, UserType, role_info_for};
pub use scope::PermissionScope;
pub use user::AuthenticatedUser;
