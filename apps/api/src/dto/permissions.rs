use innkeep_domain::RequirementInput;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::ScopeFilterResponse;
use super::roles::RoleResponse;

/// A permission requirement in either compact or structured form.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(untagged)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-requirement-request.ts"
)]
pub enum PermissionRequirementRequest {
    Compact(String),
    Structured {
        resource: String,
        action: String,
        scope: String,
    },
}

impl From<PermissionRequirementRequest> for RequirementInput {
    fn from(value: PermissionRequirementRequest) -> Self {
        match value {
            PermissionRequirementRequest::Compact(value) => Self::Compact(value),
            PermissionRequirementRequest::Structured {
                resource,
                action,
                scope,
            } => Self::Structured {
                resource,
                action,
                scope,
                conditions: None,
            },
        }
    }
}

/// Incoming payload for an ad-hoc permission check. Any one requirement
/// suffices.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permissions-request.ts"
)]
pub struct CheckPermissionsRequest {
    pub permissions: Vec<PermissionRequirementRequest>,
    #[serde(default, alias = "organizationId")]
    pub organization_id: Option<String>,
    #[serde(default, alias = "propertyId")]
    pub property_id: Option<String>,
    #[serde(default, alias = "departmentId")]
    pub department_id: Option<String>,
    #[serde(default, alias = "ownerId")]
    pub owner_id: Option<String>,
}

/// Outcome of an ad-hoc permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permissions-response.ts"
)]
pub struct CheckPermissionsResponse {
    pub granted: bool,
    pub reason: Option<String>,
    pub scope_filters: Option<ScopeFilterResponse>,
}

/// The caller's identity and effective permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/my-permissions-response.ts"
)]
pub struct MyPermissionsResponse {
    pub user_id: String,
    pub role: RoleResponse,
    pub organization_id: Option<String>,
    pub property_id: Option<String>,
    pub department_id: Option<String>,
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use innkeep_domain::normalize_requirement;

    use super::{CheckPermissionsRequest, PermissionRequirementRequest};

    #[test]
    fn both_requirement_forms_are_accepted() {
        let payload = serde_json::json!({
            "permissions": [
                "reservation.read.property",
                { "resource": "Payroll", "action": "READ", "scope": "own" }
            ],
            "propertyId": "6f0f8f7e-3f44-4bd1-9a47-0c4c07a61f11"
        });

        let request: CheckPermissionsRequest =
            serde_json::from_value(payload).unwrap_or_else(|error| panic!("{error}"));
        let normalized = request
            .permissions
            .into_iter()
            .map(|requirement| {
                normalize_requirement(requirement)
                    .map(|requirement| requirement.to_string())
                    .unwrap_or_else(|error| panic!("{error}"))
            })
            .collect::<Vec<_>>();

        assert_eq!(
            normalized,
            vec!["reservation.read.property", "payroll.read.own"]
        );
        assert_eq!(
            request.property_id.as_deref(),
            Some("6f0f8f7e-3f44-4bd1-9a47-0c4c07a61f11")
        );
    }

    #[test]
    fn structured_requirement_without_scope_fails_normalization() {
        let requirement = PermissionRequirementRequest::Structured {
            resource: "reservation".to_owned(),
            action: "read".to_owned(),
            scope: " ".to_owned(),
        };

        assert!(normalize_requirement(requirement).is_err());
    }
}
