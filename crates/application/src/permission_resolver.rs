use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use innkeep_core::{AppError, AppResult, UserId};
use innkeep_domain::AuthenticatedUser;
use tracing::{debug, info, warn};

use crate::{AuthorizationRepository, PermissionCache};

/// Default effective-permission cache lifetime.
pub const DEFAULT_PERMISSION_CACHE_TTL_SECONDS: u32 = 300;

/// Default upper bound for one persistence lookup.
pub const DEFAULT_PERMISSION_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Resolver tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Cache lifetime in seconds; zero disables caching.
    pub cache_ttl_seconds: u32,
    /// Upper bound for each persistence lookup.
    pub lookup_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: DEFAULT_PERMISSION_CACHE_TTL_SECONDS,
            lookup_timeout: DEFAULT_PERMISSION_LOOKUP_TIMEOUT,
        }
    }
}

/// Aggregates a user's effective permission strings from custom roles,
/// direct overrides and the legacy role table.
#[derive(Clone)]
pub struct PermissionResolver {
    repository: Arc<dyn AuthorizationRepository>,
    cache: Arc<dyn PermissionCache>,
    config: ResolverConfig,
}

impl PermissionResolver {
    /// Creates a resolver over a repository and a cache.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        cache: Arc<dyn PermissionCache>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            repository,
            cache,
            config,
        }
    }

    /// Returns the deduplicated effective permission strings for a user.
    ///
    /// Persistence failures are logged and yield an empty set, which is never
    /// cached.
    pub async fn effective_permissions(&self, user: &AuthenticatedUser) -> Vec<String> {
        let user_id = user.id();
        match self.cache.get_permissions(user_id).await {
            Ok(Some(permissions)) => {
                debug!(%user_id, count = permissions.len(), "permission cache hit");
                return permissions;
            }
            Ok(None) => debug!(%user_id, "permission cache miss"),
            Err(error) => warn!(%user_id, %error, "permission cache read failed"),
        }

        let permissions = match self.aggregate(user).await {
            Ok(permissions) => permissions,
            Err(error) => {
                warn!(
                    %user_id,
                    role = %user.role(),
                    %error,
                    "failed to resolve effective permissions, failing closed"
                );
                return Vec::new();
            }
        };

        if self.config.cache_ttl_seconds > 0
            && let Err(error) = self
                .cache
                .set_permissions(user_id, permissions.clone(), self.config.cache_ttl_seconds)
                .await
        {
            warn!(%user_id, %error, "permission cache write failed");
        }

        permissions
    }

    /// Drops the cached permission set for a user.
    ///
    /// Must be awaited by every flow that changes the user's role, custom-role
    /// assignments or direct permissions before that flow responds.
    pub async fn clear_cache(&self, user_id: UserId) -> AppResult<()> {
        self.cache.invalidate(user_id).await?;
        info!(%user_id, "cleared effective permission cache");
        Ok(())
    }

    /// Drops every cached permission set.
    pub async fn clear_all_caches(&self) -> AppResult<()> {
        self.cache.invalidate_all().await?;
        info!("cleared all effective permission caches");
        Ok(())
    }

    async fn aggregate(&self, user: &AuthenticatedUser) -> AppResult<Vec<String>> {
        let now = Utc::now();
        let user_id = user.id();

        let assignments = self
            .bounded(
                "custom role assignments",
                self.repository
                    .list_active_custom_role_assignments(user_id, now),
            )
            .await?;
        let overrides = self
            .bounded(
                "direct permissions",
                self.repository.list_active_user_permissions(user_id, now),
            )
            .await?;

        let mut permissions: BTreeSet<String> = assignments
            .iter()
            .filter(|assignment| assignment.is_effective_at(now))
            .flat_map(|assignment| assignment.custom_role.granted_permission_strings())
            .collect();

        let (grants, denials): (Vec<_>, Vec<_>) = overrides
            .iter()
            .filter(|entry| entry.is_effective_at(now))
            .partition(|entry| entry.granted);

        permissions.extend(
            grants
                .iter()
                .map(|entry| entry.permission.permission_string()),
        );
        // Denials cancel the exact string only, whichever source granted it.
        for denial in denials {
            permissions.remove(denial.permission.permission_string().as_str());
        }

        if permissions.is_empty() || user.role().is_top_administrative() {
            permissions.extend(
                user.role()
                    .legacy_permissions()
                    .iter()
                    .map(|permission| (*permission).to_owned()),
            );
        }

        Ok(permissions.into_iter().collect())
    }

    async fn bounded<T>(
        &self,
        lookup_name: &str,
        lookup: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        tokio::time::timeout(self.config.lookup_timeout, lookup)
            .await
            .map_err(|_| {
                AppError::Internal(format!(
                    "timed out after {}ms loading {lookup_name}",
                    self.config.lookup_timeout.as_millis()
                ))
            })?
    }
}
