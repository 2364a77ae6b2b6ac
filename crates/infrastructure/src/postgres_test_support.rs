//! Database fixtures for the Postgres adapter suites.
//!
//! Suites return early when `DATABASE_URL` is not set.

use chrono::{DateTime, Utc};
use innkeep_core::{CustomRoleId, OrganizationId, PermissionId, UserId};
use innkeep_domain::Role;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres access tests: {error}");
    }

    Some(pool)
}

pub(crate) async fn insert_user(
    pool: &PgPool,
    role: Role,
    organization_id: Option<OrganizationId>,
) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query(
        r#"
        INSERT INTO users (id, email, display_name, role, organization_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("{user_id}@innkeep.test"))
    .bind("Test User")
    .bind(role.as_str())
    .bind(organization_id.map(|organization_id| organization_id.as_uuid()))
    .execute(pool)
    .await;

    assert!(insert.is_ok(), "{insert:?}");
    user_id
}

// Permission rows are unique per string, so suites use distinct resources.
pub(crate) async fn insert_permission(pool: &PgPool, value: &str) -> PermissionId {
    let mut segments = value.splitn(3, '.');
    let permission_id = PermissionId::new();
    let insert = sqlx::query_scalar::<_, uuid::Uuid>(
        r#"
        INSERT INTO permissions (id, resource, action, scope)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (resource, action, scope) DO UPDATE SET name = permissions.name
        RETURNING id
        "#,
    )
    .bind(permission_id.as_uuid())
    .bind(segments.next().unwrap_or_default())
    .bind(segments.next().unwrap_or_default())
    .bind(segments.next().unwrap_or_default())
    .fetch_one(pool)
    .await;

    let Ok(id) = insert else {
        panic!("failed to insert permission '{value}': {insert:?}");
    };
    PermissionId::from_uuid(id)
}

pub(crate) async fn insert_custom_role(
    pool: &PgPool,
    name: &str,
    permission_ids: &[PermissionId],
) -> CustomRoleId {
    let custom_role_id = CustomRoleId::new();
    let insert = sqlx::query(
        r#"
        INSERT INTO custom_roles (id, name, priority)
        VALUES ($1, $2, 10)
        "#,
    )
    .bind(custom_role_id.as_uuid())
    .bind(name)
    .execute(pool)
    .await;
    assert!(insert.is_ok(), "{insert:?}");

    for permission_id in permission_ids {
        let attach = sqlx::query(
            r#"
            INSERT INTO custom_role_permissions (custom_role_id, permission_id, granted)
            VALUES ($1, $2, TRUE)
            "#,
        )
        .bind(custom_role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(pool)
        .await;
        assert!(attach.is_ok(), "{attach:?}");
    }

    custom_role_id
}

pub(crate) async fn assign_custom_role(
    pool: &PgPool,
    user_id: UserId,
    custom_role_id: CustomRoleId,
    expires_at: Option<DateTime<Utc>>,
) {
    let insert = sqlx::query(
        r#"
        INSERT INTO user_custom_roles (user_id, custom_role_id, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(custom_role_id.as_uuid())
    .bind(expires_at)
    .execute(pool)
    .await;

    assert!(insert.is_ok(), "{insert:?}");
}
