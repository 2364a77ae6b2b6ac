//! Application services and ports.

#![forbid(unsafe_code)]

mod access_admin_ports;
mod access_admin_service;
mod authorization_gate;
mod authorization_ports;
mod authorization_service;
mod permission_resolver;

#[cfg(test)]
mod test_support;

pub use access_admin_ports::{
    AccessAdminRepository, AssignCustomRoleInput, ManagedUser, RoleCount, RoleStatistics,
    SetUserPermissionInput,
};
pub use access_admin_service::AccessAdminService;
pub use authorization_gate::{
    AccessDeclaration, AuthorizationGate, AuthorizedRequest, GateConfig, LegacyPermissionBridge,
    NameInferenceBridge, OperationAccess, RequestScope,
};
pub use authorization_ports::{AuthorizationRepository, PermissionCache};
pub use authorization_service::{
    AuthorizationService, DepartmentAdminPropertyReadOnly, PermissionDecision, ScopeNarrowingRule,
};
pub use permission_resolver::{
    DEFAULT_PERMISSION_CACHE_TTL_SECONDS, DEFAULT_PERMISSION_LOOKUP_TIMEOUT, PermissionResolver,
    ResolverConfig,
};
