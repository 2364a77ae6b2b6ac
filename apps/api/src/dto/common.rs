use innkeep_domain::ScopeFilter;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
    pub redis: HealthDependencyStatus,
}

/// Status of one backing dependency.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Tenant constraints attached to a grant. Absent fields are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/scope-filter-response.ts"
)]
pub struct ScopeFilterResponse {
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub property_id: Option<String>,
    pub department_id: Option<String>,
}

impl From<ScopeFilter> for ScopeFilterResponse {
    fn from(value: ScopeFilter) -> Self {
        Self {
            user_id: value.user_id.map(|id| id.to_string()),
            organization_id: value.organization_id.map(|id| id.to_string()),
            property_id: value.property_id.map(|id| id.to_string()),
            department_id: value.department_id.map(|id| id.to_string()),
        }
    }
}
