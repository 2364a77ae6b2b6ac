use super::*;

pub async fn change_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    Json(payload): Json<ChangeUserRoleRequest>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::from_str(user_id.as_str())?;
    let role = Role::from_str(payload.role.as_str())?;

    state
        .access_admin_service
        .change_user_role(&user, user_id, role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_custom_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignCustomRoleRequest>,
) -> ApiResult<(StatusCode, Json<CustomRoleAssignmentResponse>)> {
    let input = AssignCustomRoleInput {
        user_id: UserId::from_str(user_id.as_str())?,
        custom_role_id: CustomRoleId::from_str(payload.custom_role_id.as_str())?,
        expires_at: parse_timestamp("expires_at", payload.expires_at.as_deref())?,
        conditions: payload.conditions,
        metadata: payload.metadata,
    };

    let assignment = state
        .access_admin_service
        .assign_custom_role(&user, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CustomRoleAssignmentResponse::from(assignment)),
    ))
}

pub async fn revoke_custom_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((user_id, custom_role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .access_admin_service
        .revoke_custom_role(
            &user,
            UserId::from_str(user_id.as_str())?,
            CustomRoleId::from_str(custom_role_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_user_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((user_id, permission_id)): Path<(String, String)>,
    Json(payload): Json<SetUserPermissionRequest>,
) -> ApiResult<StatusCode> {
    let input = SetUserPermissionInput {
        user_id: UserId::from_str(user_id.as_str())?,
        permission_id: PermissionId::from_str(permission_id.as_str())?,
        granted: payload.granted,
        expires_at: parse_timestamp("expires_at", payload.expires_at.as_deref())?,
    };

    state
        .access_admin_service
        .set_user_permission(&user, input)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_user_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((user_id, permission_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .access_admin_service
        .remove_user_permission(
            &user,
            UserId::from_str(user_id.as_str())?,
            PermissionId::from_str(permission_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
