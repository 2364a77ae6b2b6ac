mod access_admin;
mod common;
mod permissions;
mod roles;

pub use access_admin::{
    AssignCustomRoleRequest, ChangeUserRoleRequest, CustomRoleAssignmentResponse,
    SetUserPermissionRequest,
};
pub use common::{HealthDependencyStatus, HealthResponse, ScopeFilterResponse};
pub use permissions::{
    CheckPermissionsRequest, CheckPermissionsResponse, MyPermissionsResponse,
    PermissionRequirementRequest,
};
pub use roles::{RoleCountResponse, RoleResponse, RoleStatisticsResponse};

#[cfg(test)]
mod tests {
    use super::{
        AssignCustomRoleRequest, ChangeUserRoleRequest, CheckPermissionsRequest,
        CheckPermissionsResponse, CustomRoleAssignmentResponse, HealthDependencyStatus,
        HealthResponse, MyPermissionsResponse, PermissionRequirementRequest, RoleCountResponse,
        RoleResponse, RoleStatisticsResponse, ScopeFilterResponse, SetUserPermissionRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        PermissionRequirementRequest::export(&config)?;
        CheckPermissionsRequest::export(&config)?;
        CheckPermissionsResponse::export(&config)?;
        MyPermissionsResponse::export(&config)?;
        ScopeFilterResponse::export(&config)?;
        RoleResponse::export(&config)?;
        RoleCountResponse::export(&config)?;
        RoleStatisticsResponse::export(&config)?;
        ChangeUserRoleRequest::export(&config)?;
        AssignCustomRoleRequest::export(&config)?;
        CustomRoleAssignmentResponse::export(&config)?;
        SetUserPermissionRequest::export(&config)?;
        HealthDependencyStatus::export(&config)?;
        HealthResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }
}
