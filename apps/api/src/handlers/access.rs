use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};

use innkeep_application::{AssignCustomRoleInput, AuthorizedRequest, SetUserPermissionInput};
use innkeep_core::{AppError, AppResult, CustomRoleId, PermissionId, UserId};
use innkeep_domain::{AuthenticatedUser, PermissionContext, Role, normalize_requirement};

use crate::dto::{
    AssignCustomRoleRequest, ChangeUserRoleRequest, CheckPermissionsRequest,
    CheckPermissionsResponse, CustomRoleAssignmentResponse, MyPermissionsResponse, RoleResponse,
    RoleStatisticsResponse, ScopeFilterResponse, SetUserPermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod permissions;
mod roles;
mod users;

pub use permissions::{check_permissions_handler, my_permissions_handler};
pub use roles::{assignable_roles_handler, list_roles_handler, role_statistics_handler};
pub use users::{
    assign_custom_role_handler, change_user_role_handler, remove_user_permission_handler,
    revoke_custom_role_handler, set_user_permission_handler,
};

fn parse_identifier<T>(value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(T::from_str)
        .transpose()
}

fn parse_timestamp(field: &str, value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    value
        .map(|value| {
            DateTime::parse_from_rfc3339(value.trim())
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|error| AppError::Validation(format!("invalid {field} '{value}': {error}")))
        })
        .transpose()
}
