use async_trait::async_trait;
use chrono::{DateTime, Utc};

use innkeep_application::AuthorizationRepository;
use innkeep_core::{AppError, AppResult, UserId};
use innkeep_domain::{UserCustomRole, UserPermission};

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::postgres_access_rows::{CustomRoleRow, PermissionRow, load_role_permissions};

/// PostgreSQL-backed repository for effective permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    user_id: Uuid,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    assigned_by: Option<Uuid>,
    assigned_at: DateTime<Utc>,
    conditions: Option<serde_json::Value>,
    metadata: Option<serde_json::Value>,
    #[sqlx(flatten)]
    role: CustomRoleRow,
}

#[derive(Debug, FromRow)]
struct UserPermissionRow {
    user_id: Uuid,
    granted: bool,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    #[sqlx(flatten)]
    permission: PermissionRow,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_active_custom_role_assignments(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserCustomRole>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT
                assignments.user_id,
                assignments.is_active,
                assignments.expires_at,
                assignments.assigned_by,
                assignments.assigned_at,
                assignments.conditions,
                assignments.metadata,
                roles.id AS custom_role_id,
                roles.name AS role_name,
                roles.organization_id AS role_organization_id,
                roles.property_id AS role_property_id,
                roles.is_system_role,
                roles.is_active AS role_is_active,
                roles.priority,
                roles.deleted_at
            FROM user_custom_roles AS assignments
            INNER JOIN custom_roles AS roles
                ON roles.id = assignments.custom_role_id
            WHERE assignments.user_id = $1
                AND assignments.is_active
                AND (assignments.expires_at IS NULL OR assignments.expires_at > $2)
                AND roles.is_active
                AND roles.deleted_at IS NULL
            ORDER BY roles.priority DESC, roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load custom role assignments for user '{user_id}': {error}"
            ))
        })?;

        let role_ids: Vec<Uuid> = rows.iter().map(|row| row.role.custom_role_id).collect();
        let mut permissions = load_role_permissions(&self.pool, &role_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let role_permissions = permissions
                    .remove(&row.role.custom_role_id)
                    .unwrap_or_default();
                UserCustomRole {
                    user_id: UserId::from_uuid(row.user_id),
                    custom_role: row.role.into_custom_role(role_permissions),
                    is_active: row.is_active,
                    expires_at: row.expires_at,
                    assigned_by: row.assigned_by.map(UserId::from_uuid),
                    assigned_at: row.assigned_at,
                    conditions: row.conditions,
                    metadata: row.metadata,
                }
            })
            .collect())
    }

    async fn list_active_user_permissions(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermission>> {
        let rows = sqlx::query_as::<_, UserPermissionRow>(
            r#"
            SELECT
                overrides.user_id,
                overrides.granted,
                overrides.is_active,
                overrides.expires_at,
                permissions.id AS permission_id,
                permissions.resource,
                permissions.action,
                permissions.scope,
                permissions.name,
                permissions.description
            FROM user_permissions AS overrides
            INNER JOIN permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.user_id = $1
                AND overrides.is_active
                AND (overrides.expires_at IS NULL OR overrides.expires_at > $2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load direct permissions for user '{user_id}': {error}"
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| UserPermission {
                user_id: UserId::from_uuid(row.user_id),
                permission: row.permission.into(),
                granted: row.granted,
                is_active: row.is_active,
                expires_at: row.expires_at,
            })
            .collect())
    }
}
