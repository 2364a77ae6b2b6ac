use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use innkeep_application::{
    AccessAdminRepository, AssignCustomRoleInput, ManagedUser, RoleCount, SetUserPermissionInput,
};
use innkeep_core::{
    AppError, AppResult, CustomRoleId, DepartmentId, OrganizationId, PermissionId, PropertyId,
    UserId,
};
use innkeep_domain::{
    CustomRole, PermissionDefinition, Role, ScopeFilter, UserCustomRole, UserType,
};

use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::postgres_access_rows::{CustomRoleRow, PermissionRow, load_role_permissions};

/// PostgreSQL-backed repository for access administration.
#[derive(Clone)]
pub struct PostgresAccessAdminRepository {
    pool: PgPool,
}

impl PostgresAccessAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ManagedUserRow {
    id: Uuid,
    role: String,
    user_type: String,
    organization_id: Option<Uuid>,
    property_id: Option<Uuid>,
    department_id: Option<Uuid>,
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
}

#[derive(Debug, FromRow)]
struct RoleCountRow {
    role: String,
    user_count: i64,
}

#[async_trait]
impl AccessAdminRepository for PostgresAccessAdminRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<ManagedUser>> {
        let row = sqlx::query_as::<_, ManagedUserRow>(
            r#"
            SELECT id, role, user_type, organization_id, property_id, department_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user '{user_id}': {error}")))?;

        row.map(|row| {
            let role = Role::from_str(row.role.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode role '{}' for user '{user_id}': {error}",
                    row.role
                ))
            })?;
            let user_type = UserType::from_str(row.user_type.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode user type '{}' for user '{user_id}': {error}",
                    row.user_type
                ))
            })?;

            Ok(ManagedUser {
                user_id: UserId::from_uuid(row.id),
                role,
                user_type,
                organization_id: row.organization_id.map(OrganizationId::from_uuid),
                property_id: row.property_id.map(PropertyId::from_uuid),
                department_id: row.department_id.map(DepartmentId::from_uuid),
            })
        })
        .transpose()
    }

    async fn update_user_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2, user_type = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .bind(role.user_type().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update role for user '{user_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        }

        Ok(())
    }

    async fn find_custom_role(
        &self,
        custom_role_id: CustomRoleId,
    ) -> AppResult<Option<CustomRole>> {
        let row = sqlx::query_as::<_, CustomRoleRow>(
            r#"
            SELECT
                id AS custom_role_id,
                name AS role_name,
                organization_id AS role_organization_id,
                property_id AS role_property_id,
                is_system_role,
                is_active AS role_is_active,
                priority,
                deleted_at
            FROM custom_roles
            WHERE id = $1
            "#,
        )
        .bind(custom_role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load custom role '{custom_role_id}': {error}"
            ))
        })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut permissions = load_role_permissions(&self.pool, &[row.custom_role_id]).await?;
        let role_permissions = permissions.remove(&row.custom_role_id).unwrap_or_default();
        Ok(Some(row.into_custom_role(role_permissions)))
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<PermissionDefinition>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id AS permission_id, resource, action, scope, name, description
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load permission '{permission_id}': {error}"
            ))
        })?;

        Ok(row.map(PermissionDefinition::from))
    }

    async fn upsert_custom_role_assignment(
        &self,
        input: AssignCustomRoleInput,
        assigned_by: UserId,
    ) -> AppResult<UserCustomRole> {
        let custom_role = self
            .find_custom_role(input.custom_role_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("custom role '{}' not found", input.custom_role_id))
            })?;

        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            INSERT INTO user_custom_roles (
                user_id,
                custom_role_id,
                is_active,
                expires_at,
                assigned_by,
                assigned_at,
                conditions,
                metadata
            )
            VALUES ($1, $2, TRUE, $3, $4, now(), $5, $6)
            ON CONFLICT (user_id, custom_role_id) DO UPDATE
            SET is_active = TRUE,
                expires_at = EXCLUDED.expires_at,
                assigned_by = EXCLUDED.assigned_by,
                assigned_at = EXCLUDED.assigned_at,
                conditions = EXCLUDED.conditions,
                metadata = EXCLUDED.metadata
            RETURNING
                user_id,
                is_active,
                expires_at,
                assigned_by,
                assigned_at,
                conditions,
                metadata
            "#,
        )
        .bind(input.user_id.as_uuid())
        .bind(input.custom_role_id.as_uuid())
        .bind(input.expires_at)
        .bind(assigned_by.as_uuid())
        .bind(input.conditions)
        .bind(input.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to assign custom role '{}' to user '{}': {error}",
                input.custom_role_id, input.user_id
            ))
        })?;

        Ok(UserCustomRole {
            user_id: UserId::from_uuid(row.user_id),
            custom_role,
            is_active: row.is_active,
            expires_at: row.expires_at,
            assigned_by: row.assigned_by.map(UserId::from_uuid),
            assigned_at: row.assigned_at,
            conditions: row.conditions,
            metadata: row.metadata,
        })
    }

    async fn deactivate_custom_role_assignment(
        &self,
        user_id: UserId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_custom_roles
            SET is_active = FALSE
            WHERE user_id = $1 AND custom_role_id = $2 AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(custom_role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to revoke custom role '{custom_role_id}' from user '{user_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_user_permission(&self, input: SetUserPermissionInput) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission_id, granted, is_active, expires_at)
            VALUES ($1, $2, $3, TRUE, $4)
            ON CONFLICT (user_id, permission_id) DO UPDATE
            SET granted = EXCLUDED.granted,
                is_active = TRUE,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(input.user_id.as_uuid())
        .bind(input.permission_id.as_uuid())
        .bind(input.granted)
        .bind(input.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save permission '{}' for user '{}': {error}",
                input.permission_id, input.user_id
            ))
        })?;

        Ok(())
    }

    async fn delete_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_permissions
            WHERE user_id = $1 AND permission_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to remove permission '{permission_id}' for user '{user_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_users_by_role(
        &self,
        filter: Option<&ScopeFilter>,
    ) -> AppResult<Vec<RoleCount>> {
        let filter = filter.cloned().unwrap_or_default();
        let rows = sqlx::query_as::<_, RoleCountRow>(
            r#"
            SELECT role, COUNT(*) AS user_count
            FROM users
            WHERE ($1::UUID IS NULL OR id = $1)
              AND ($2::UUID IS NULL OR organization_id = $2)
              AND ($3::UUID IS NULL OR property_id = $3)
              AND ($4::UUID IS NULL OR department_id = $4)
            GROUP BY role
            "#,
        )
        .bind(filter.user_id.map(|user_id| user_id.as_uuid()))
        .bind(
            filter
                .organization_id
                .map(|organization_id| organization_id.as_uuid()),
        )
        .bind(filter.property_id.map(|property_id| property_id.as_uuid()))
        .bind(
            filter
                .department_id
                .map(|department_id| department_id.as_uuid()),
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count users by role: {error}")))?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let Ok(role) = Role::from_str(row.role.as_str()) else {
                warn!(role = %row.role, "skipping users with an unknown stored role");
                continue;
            };

            counts.push(RoleCount {
                role,
                user_count: u64::try_from(row.user_count).unwrap_or_default(),
            });
        }

        Ok(counts)
    }
}
