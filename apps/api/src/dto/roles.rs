use innkeep_domain::Role;
use serde::Serialize;
use ts_rs::TS;

use super::common::ScopeFilterResponse;

/// API representation of a system role and its metadata.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role: String,
    pub name: String,
    pub description: String,
    pub level: u8,
    pub user_type: String,
    pub capabilities: Vec<String>,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        let info = value.info();
        Self {
            role: value.as_str().to_owned(),
            name: info.name.to_owned(),
            description: info.description.to_owned(),
            level: info.level,
            user_type: info.user_type.as_str().to_owned(),
            capabilities: info
                .capabilities
                .iter()
                .map(|capability| (*capability).to_owned())
                .collect(),
        }
    }
}

/// Number of users holding one system role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-count-response.ts"
)]
pub struct RoleCountResponse {
    pub role: String,
    pub name: String,
    pub user_count: u64,
}

impl From<innkeep_application::RoleCount> for RoleCountResponse {
    fn from(value: innkeep_application::RoleCount) -> Self {
        Self {
            role: value.role.as_str().to_owned(),
            name: value.role.info().name.to_owned(),
            user_count: value.user_count,
        }
    }
}

/// User counts per role, with the tenant scope they were counted in.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-statistics-response.ts"
)]
pub struct RoleStatisticsResponse {
    pub scope_filters: Option<ScopeFilterResponse>,
    pub roles: Vec<RoleCountResponse>,
}
