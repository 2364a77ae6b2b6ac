use super::*;

pub async fn my_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<MyPermissionsResponse> {
    let permissions = state.authorization_service.effective_permissions(&user).await;

    Json(MyPermissionsResponse {
        user_id: user.id().to_string(),
        role: RoleResponse::from(user.role()),
        organization_id: user.organization_id().map(|id| id.to_string()),
        property_id: user.property_id().map(|id| id.to_string()),
        department_id: user.department_id().map(|id| id.to_string()),
        permissions,
    })
}

pub async fn check_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CheckPermissionsRequest>,
) -> ApiResult<Json<CheckPermissionsResponse>> {
    if payload.permissions.is_empty() {
        return Err(AppError::Validation("at least one permission is required".to_owned()).into());
    }

    let requirements = payload
        .permissions
        .into_iter()
        .map(normalize_requirement)
        .collect::<Result<Vec<_>, _>>()?;

    let context = PermissionContext {
        user: Some(user),
        organization_id: parse_identifier(payload.organization_id.as_deref())?,
        property_id: parse_identifier(payload.property_id.as_deref())?,
        department_id: parse_identifier(payload.department_id.as_deref())?,
        resource_owner_id: parse_identifier(payload.owner_id.as_deref())?,
    };

    let decision = state
        .authorization_service
        .evaluate_any(&requirements, &context)
        .await;

    Ok(Json(CheckPermissionsResponse {
        granted: decision.granted,
        reason: decision.reason,
        scope_filters: decision.scope_filters.map(ScopeFilterResponse::from),
    }))
}
