//! Fakes shared by the application test suites.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use innkeep_core::{
    AppError, AppResult, CustomRoleId, DepartmentId, OrganizationId, PermissionId, PropertyId,
    UserId,
};
use innkeep_domain::{
    AuthenticatedUser, CustomRole, CustomRolePermission, PermissionDefinition, Role,
    UserCustomRole, UserPermission,
};
use tokio::sync::Mutex;

use crate::{
    AuthorizationRepository, AuthorizationService, PermissionCache, PermissionResolver,
    ResolverConfig,
};

#[derive(Default)]
pub(crate) struct FakeAuthorizationRepository {
    assignments: Mutex<HashMap<UserId, Vec<UserCustomRole>>>,
    overrides: Mutex<HashMap<UserId, Vec<UserPermission>>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    lookups: AtomicUsize,
}

impl FakeAuthorizationRepository {
    pub(crate) async fn add_custom_role(
        &self,
        user_id: UserId,
        permissions: &[&str],
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.assignments
            .lock()
            .await
            .entry(user_id)
            .or_default()
            .push(custom_role_assignment(user_id, permissions, expires_at));
    }

    pub(crate) async fn add_user_permission(
        &self,
        user_id: UserId,
        permission: &str,
        granted: bool,
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.overrides
            .lock()
            .await
            .entry(user_id)
            .or_default()
            .push(UserPermission {
                user_id,
                permission: definition(permission),
                granted,
                is_active: true,
                expires_at,
            });
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    pub(crate) fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn list_active_custom_role_assignments(
        &self,
        user_id: UserId,
        _now: DateTime<Utc>,
    ) -> AppResult<Vec<UserCustomRole>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("database unavailable".to_owned()));
        }

        // Expiry filtering is left to the resolver on purpose.
        Ok(self
            .assignments
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_active_user_permissions(
        &self,
        user_id: UserId,
        _now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermission>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("database unavailable".to_owned()));
        }

        Ok(self
            .overrides
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct FakePermissionCache {
    entries: Mutex<HashMap<UserId, Vec<String>>>,
    invalidations: AtomicUsize,
}

impl FakePermissionCache {
    pub(crate) fn invalidation_count(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionCache for FakePermissionCache {
    async fn get_permissions(&self, user_id: UserId) -> AppResult<Option<Vec<String>>> {
        Ok(self.entries.lock().await.get(&user_id).cloned())
    }

    async fn set_permissions(
        &self,
        user_id: UserId,
        permissions: Vec<String>,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        self.entries.lock().await.insert(user_id, permissions);
        Ok(())
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().await.remove(&user_id);
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().await.clear();
        Ok(())
    }
}

pub(crate) struct Fixture {
    pub(crate) repository: Arc<FakeAuthorizationRepository>,
    pub(crate) cache: Arc<FakePermissionCache>,
    pub(crate) resolver: PermissionResolver,
    pub(crate) service: AuthorizationService,
}

pub(crate) fn fixture() -> Fixture {
    fixture_with_config(ResolverConfig::default())
}

pub(crate) fn fixture_with_config(config: ResolverConfig) -> Fixture {
    let repository = Arc::new(FakeAuthorizationRepository::default());
    let cache = Arc::new(FakePermissionCache::default());
    let resolver = PermissionResolver::new(repository.clone(), cache.clone(), config);
    let service = AuthorizationService::new(resolver.clone());

    Fixture {
        repository,
        cache,
        resolver,
        service,
    }
}

pub(crate) fn placed_user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(), role)
        .with_organization(OrganizationId::new())
        .with_property(PropertyId::new())
        .with_department(DepartmentId::new())
}

pub(crate) fn definition(value: &str) -> PermissionDefinition {
    let mut segments = value.splitn(3, '.');
    PermissionDefinition {
        permission_id: PermissionId::new(),
        resource: segments.next().unwrap_or_default().to_owned(),
        action: segments.next().unwrap_or_default().to_owned(),
        scope: segments.next().unwrap_or_default().to_owned(),
        name: None,
        description: None,
    }
}

pub(crate) fn custom_role_assignment(
    user_id: UserId,
    permissions: &[&str],
    expires_at: Option<DateTime<Utc>>,
) -> UserCustomRole {
    UserCustomRole {
        user_id,
        custom_role: CustomRole {
            custom_role_id: CustomRoleId::new(),
            name: "front-desk".to_owned(),
            organization_id: None,
            property_id: None,
            is_system_role: false,
            is_active: true,
            priority: 4,
            deleted_at: None,
            permissions: permissions
                .iter()
                .map(|permission| CustomRolePermission {
                    permission: definition(permission),
                    granted: true,
                })
                .collect(),
        },
        is_active: true,
        expires_at,
        assigned_by: None,
        assigned_at: Utc::now(),
        conditions: None,
        metadata: None,
    }
}
