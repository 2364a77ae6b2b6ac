use std::sync::Arc;

use innkeep_application::{
    AccessAdminRepository, AccessAdminService, AuthorizationGate, AuthorizationService,
    GateConfig, NameInferenceBridge, PermissionResolver, ResolverConfig,
};
use innkeep_core::AppError;
use innkeep_infrastructure::{PostgresAccessAdminRepository, PostgresAuthorizationRepository};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::{ApiConfig, PermissionCacheBackend};
use crate::state::AppState;

use super::redis::build_redis_client;

mod caches;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;

    let permission_cache = caches::build_permission_cache(config, redis_client.clone())?;
    let resolver = PermissionResolver::new(
        Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        permission_cache,
        ResolverConfig {
            cache_ttl_seconds: config.permission_cache_ttl_seconds,
            lookup_timeout: config.permission_lookup_timeout,
        },
    );
    let authorization_service = AuthorizationService::new(resolver);

    let mut authorization_gate = AuthorizationGate::new(
        authorization_service.clone(),
        GateConfig {
            legacy_roles_enabled: config.legacy_role_checks,
        },
    );
    if config.legacy_permission_bridge {
        authorization_gate = authorization_gate.with_legacy_bridge(Arc::new(NameInferenceBridge));
    }
    info!(
        legacy_role_checks = config.legacy_role_checks,
        legacy_permission_bridge = config.legacy_permission_bridge,
        "authorization gate configured"
    );

    let user_directory: Arc<dyn AccessAdminRepository> =
        Arc::new(PostgresAccessAdminRepository::new(pool.clone()));

    Ok(AppState {
        access_admin_service: AccessAdminService::new(
            authorization_service.clone(),
            user_directory.clone(),
        ),
        authorization_service,
        authorization_gate,
        user_directory,
        frontend_url: config.frontend_url.clone(),
        postgres_pool: pool,
        redis_client,
        redis_required: config.permission_cache_backend == PermissionCacheBackend::Redis,
    })
}
