use super::*;

pub async fn list_roles_handler() -> Json<Vec<RoleResponse>> {
    Json(Role::all().iter().copied().map(RoleResponse::from).collect())
}

pub async fn assignable_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<Vec<RoleResponse>> {
    let roles = state
        .authorization_service
        .assignable_roles(user.role())
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Json(roles)
}

pub async fn role_statistics_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(authorized): Extension<AuthorizedRequest>,
) -> ApiResult<Json<RoleStatisticsResponse>> {
    let statistics = state
        .access_admin_service
        .role_statistics(&user, authorized.scope_filters.as_ref())
        .await?;

    Ok(Json(RoleStatisticsResponse {
        scope_filters: statistics.scope_filters.map(ScopeFilterResponse::from),
        roles: statistics.roles.into_iter().map(Into::into).collect(),
    }))
}
