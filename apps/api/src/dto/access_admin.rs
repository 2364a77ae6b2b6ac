use innkeep_domain::UserCustomRole;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Incoming payload for a system role change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/change-user-role-request.ts"
)]
pub struct ChangeUserRoleRequest {
    pub role: String,
}

/// Incoming payload for a custom role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-custom-role-request.ts"
)]
pub struct AssignCustomRoleRequest {
    pub custom_role_id: String,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub conditions: Option<Value>,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub metadata: Option<Value>,
}

/// API representation of a custom role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/custom-role-assignment-response.ts"
)]
pub struct CustomRoleAssignmentResponse {
    pub user_id: String,
    pub custom_role_id: String,
    pub custom_role_name: String,
    pub is_active: bool,
    pub expires_at: Option<String>,
    pub assigned_by: Option<String>,
    pub assigned_at: String,
    pub permissions: Vec<String>,
}

impl From<UserCustomRole> for CustomRoleAssignmentResponse {
    fn from(value: UserCustomRole) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            custom_role_id: value.custom_role.custom_role_id.to_string(),
            permissions: value.custom_role.granted_permission_strings().collect(),
            custom_role_name: value.custom_role.name,
            is_active: value.is_active,
            expires_at: value.expires_at.map(|expires_at| expires_at.to_rfc3339()),
            assigned_by: value.assigned_by.map(|user_id| user_id.to_string()),
            assigned_at: value.assigned_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for a direct permission grant or denial.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-user-permission-request.ts"
)]
pub struct SetUserPermissionRequest {
    pub granted: bool,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub expires_at: Option<String>,
}
