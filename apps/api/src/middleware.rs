use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{FromRequestParts, Query, RawPathParams, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use innkeep_application::{ManagedUser, OperationAccess, RequestScope};
use innkeep_core::{AppError, UserId};
use innkeep_domain::AuthenticatedUser;
use tower_sessions::Session;
use tracing::warn;

use crate::error::ApiResult;
use crate::state::AppState;

/// Session key under which the sign-in flow stores the user id.
pub const SESSION_USER_KEY: &str = "innkeep.user_id";

const MAX_GATED_BODY_BYTES: usize = 1024 * 1024;

/// Resolves the session user and attaches the current role and tenant
/// placement to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user_id = session
        .get::<UserId>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let Some(user) = state.user_directory.find_user(user_id).await? else {
        warn!(%user_id, "session refers to a user that no longer exists");
        return Err(AppError::Unauthorized("authentication required".to_owned()).into());
    };

    request.extensions_mut().insert(authenticated_user(user));
    Ok(next.run(request).await)
}

pub fn authenticated_user(user: ManagedUser) -> AuthenticatedUser {
    let mut authenticated =
        AuthenticatedUser::new(user.user_id, user.role).with_user_type(user.user_type);
    if let Some(organization_id) = user.organization_id {
        authenticated = authenticated.with_organization(organization_id);
    }
    if let Some(property_id) = user.property_id {
        authenticated = authenticated.with_property(property_id);
    }
    if let Some(department_id) = user.department_id {
        authenticated = authenticated.with_department(department_id);
    }

    authenticated
}

/// Middleware state binding one route to its access declarations.
#[derive(Clone)]
pub struct GuardedOperation {
    state: AppState,
    access: Arc<OperationAccess>,
}

impl GuardedOperation {
    pub fn new(state: AppState, access: OperationAccess) -> Self {
        Self {
            state,
            access: Arc::new(access),
        }
    }
}

/// Runs the authorization gate for a declared operation and hands the
/// resulting context and scope filters to the handler.
pub async fn enforce_operation_access(
    State(guard): State<GuardedOperation>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let (mut parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_GATED_BODY_BYTES)
        .await
        .map_err(|error| AppError::Validation(format!("failed to read request body: {error}")))?;

    let scope = request_scope(&mut parts, &bytes).await;
    let user = parts.extensions.get::<AuthenticatedUser>().cloned();
    let authorized = guard
        .state
        .authorization_gate
        .authorize(&guard.access, user.as_ref(), &scope)
        .await?;

    parts.extensions.insert(authorized);
    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

async fn request_scope(parts: &mut Parts, body: &Bytes) -> RequestScope {
    let params = RawPathParams::from_request_parts(parts, &())
        .await
        .map(|params| {
            params
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect()
        })
        .unwrap_or_default();
    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(query)| query)
        .unwrap_or_default();

    RequestScope {
        params,
        body: decode_body(body),
        query,
    }
}

fn decode_body(body: &Bytes) -> Option<serde_json::Value> {
    if body.is_empty() {
        return None;
    }

    serde_json::from_slice(body).ok()
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use innkeep_application::ManagedUser;
    use innkeep_core::{DepartmentId, OrganizationId, PropertyId, UserId};
    use innkeep_domain::{Role, UserType};

    use super::{authenticated_user, decode_body};

    #[test]
    fn managed_user_keeps_its_tenant_placement() {
        let organization_id = OrganizationId::new();
        let property_id = PropertyId::new();
        let department_id = DepartmentId::new();
        let user = authenticated_user(ManagedUser {
            user_id: UserId::new(),
            role: Role::Vendor,
            user_type: UserType::Vendor,
            organization_id: Some(organization_id),
            property_id: Some(property_id),
            department_id: Some(department_id),
        });

        assert_eq!(user.user_type(), UserType::Vendor);
        assert_eq!(user.organization_id(), Some(organization_id));
        assert_eq!(user.property_id(), Some(property_id));
        assert_eq!(user.department_id(), Some(department_id));
    }

    #[test]
    fn stored_user_type_overrides_the_role_default() {
        let user = authenticated_user(ManagedUser {
            user_id: UserId::new(),
            role: Role::Staff,
            user_type: UserType::Vendor,
            organization_id: None,
            property_id: None,
            department_id: None,
        });

        assert_eq!(user.role(), Role::Staff);
        assert_eq!(user.user_type(), UserType::Vendor);
    }

    #[test]
    fn only_json_bodies_feed_the_request_scope() {
        assert!(decode_body(&Bytes::new()).is_none());
        assert!(decode_body(&Bytes::from_static(b"role=staff")).is_none());
        assert_eq!(
            decode_body(&Bytes::from_static(br#"{"propertyId":"x"}"#))
                .and_then(|body| body.get("propertyId").cloned()),
            Some(serde_json::json!("x"))
        );
    }
}
