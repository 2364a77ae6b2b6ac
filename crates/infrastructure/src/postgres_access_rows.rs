//! Row shapes shared by the access-control repositories.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use innkeep_core::{AppError, AppResult, CustomRoleId, OrganizationId, PermissionId, PropertyId};
use innkeep_domain::{CustomRole, CustomRolePermission, PermissionDefinition};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) permission_id: Uuid,
    pub(crate) resource: String,
    pub(crate) action: String,
    pub(crate) scope: String,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

impl From<PermissionRow> for PermissionDefinition {
    fn from(row: PermissionRow) -> Self {
        Self {
            permission_id: PermissionId::from_uuid(row.permission_id),
            resource: row.resource,
            action: row.action,
            scope: row.scope,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CustomRoleRow {
    pub(crate) custom_role_id: Uuid,
    pub(crate) role_name: String,
    pub(crate) role_organization_id: Option<Uuid>,
    pub(crate) role_property_id: Option<Uuid>,
    pub(crate) is_system_role: bool,
    pub(crate) role_is_active: bool,
    pub(crate) priority: i32,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
}

impl CustomRoleRow {
    pub(crate) fn into_custom_role(self, permissions: Vec<CustomRolePermission>) -> CustomRole {
        CustomRole {
            custom_role_id: CustomRoleId::from_uuid(self.custom_role_id),
            name: self.role_name,
            organization_id: self.role_organization_id.map(OrganizationId::from_uuid),
            property_id: self.role_property_id.map(PropertyId::from_uuid),
            is_system_role: self.is_system_role,
            is_active: self.role_is_active,
            priority: self.priority,
            deleted_at: self.deleted_at,
            permissions,
        }
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    custom_role_id: Uuid,
    granted: bool,
    #[sqlx(flatten)]
    permission: PermissionRow,
}

/// Loads the attached permissions of several custom roles keyed by role id.
pub(crate) async fn load_role_permissions(
    pool: &PgPool,
    custom_role_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<CustomRolePermission>>> {
    if custom_role_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, RolePermissionRow>(
        r#"
        SELECT
            role_permissions.custom_role_id,
            role_permissions.granted,
            permissions.id AS permission_id,
            permissions.resource,
            permissions.action,
            permissions.scope,
            permissions.name,
            permissions.description
        FROM custom_role_permissions AS role_permissions
        INNER JOIN permissions
            ON permissions.id = role_permissions.permission_id
        WHERE role_permissions.custom_role_id = ANY($1)
        ORDER BY permissions.resource, permissions.action, permissions.scope
        "#,
    )
    .bind(custom_role_ids)
    .fetch_all(pool)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to load custom role permissions: {error}"))
    })?;

    let mut grouped: HashMap<Uuid, Vec<CustomRolePermission>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.custom_role_id)
            .or_default()
            .push(CustomRolePermission {
                permission: row.permission.into(),
                granted: row.granted,
            });
    }

    Ok(grouped)
}
