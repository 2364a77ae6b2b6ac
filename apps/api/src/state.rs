use std::sync::Arc;

use innkeep_application::{
    AccessAdminRepository, AccessAdminService, AuthorizationGate, AuthorizationService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub authorization_gate: AuthorizationGate,
    pub access_admin_service: AccessAdminService,
    pub user_directory: Arc<dyn AccessAdminRepository>,
    pub frontend_url: String,
    pub postgres_pool: PgPool,
    pub redis_client: Option<redis::Client>,
    pub redis_required: bool,
}
