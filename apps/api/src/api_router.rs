use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, delete, get, post, put};
use innkeep_application::OperationAccess;
use innkeep_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::middleware::GuardedOperation;
use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;
mod operations;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let guard = |method_router: MethodRouter<AppState>, access: OperationAccess| {
        method_router.route_layer(from_fn_with_state(
            GuardedOperation::new(app_state.clone(), access),
            middleware::enforce_operation_access,
        ))
    };

    let protected_routes = Router::new()
        .route(
            "/api/me/permissions",
            get(handlers::access::my_permissions_handler),
        )
        .route(
            "/api/me/permissions/check",
            post(handlers::access::check_permissions_handler),
        )
        .route("/api/roles", get(handlers::access::list_roles_handler))
        .route(
            "/api/roles/assignable",
            get(handlers::access::assignable_roles_handler),
        )
        .route(
            "/api/roles/statistics",
            guard(
                get(handlers::access::role_statistics_handler),
                operations::role_statistics()?,
            ),
        )
        .route(
            "/api/users/{user_id}/role",
            guard(
                put(handlers::access::change_user_role_handler),
                operations::change_user_role(),
            ),
        )
        .route(
            "/api/users/{user_id}/custom-roles",
            guard(
                post(handlers::access::assign_custom_role_handler),
                operations::assign_custom_role(),
            ),
        )
        .route(
            "/api/users/{user_id}/custom-roles/{custom_role_id}",
            guard(
                delete(handlers::access::revoke_custom_role_handler),
                operations::revoke_custom_role(),
            ),
        )
        .route(
            "/api/users/{user_id}/permissions/{permission_id}",
            guard(
                put(handlers::access::set_user_permission_handler),
                operations::set_user_permission()?,
            )
            .merge(guard(
                delete(handlers::access::remove_user_permission_handler),
                operations::remove_user_permission()?,
            )),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
