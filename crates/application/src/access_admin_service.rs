use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use innkeep_core::{AppError, AppResult, CustomRoleId, PermissionId, UserId};
use innkeep_domain::{
    AuthenticatedUser, PermissionConditions, PermissionContext, PermissionKey,
    PermissionRequirement, PermissionScope, Role, ScopeFilter, UserCustomRole,
};

use crate::AuthorizationService;
use crate::access_admin_ports::{
    AccessAdminRepository, AssignCustomRoleInput, ManagedUser, RoleCount, RoleStatistics,
    SetUserPermissionInput,
};

/// Application service for user access administration.
///
/// Every mutation clears the target user's permission cache before it
/// returns.
#[derive(Clone)]
pub struct AccessAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn AccessAdminRepository>,
}

impl AccessAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn AccessAdminRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Changes a user's system role.
    ///
    /// The actor must outrank the user and be able to assign the new role.
    pub async fn change_user_role(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
        role: Role,
    ) -> AppResult<()> {
        let target = self.administered_user(actor, user_id).await?;

        if !self
            .authorization_service
            .can_assign_role(actor.role(), role)
        {
            return Err(AppError::Forbidden(format!(
                "role '{}' cannot assign role '{role}'",
                actor.role()
            )));
        }

        self.repository.update_user_role(user_id, role).await?;
        self.authorization_service.clear_cache(user_id).await?;

        info!(
            actor_id = %actor.id(),
            %user_id,
            from = %target.role,
            to = %role,
            "changed user role"
        );
        Ok(())
    }

    /// Assigns a custom role, reactivating a previous assignment of the same
    /// role when one exists.
    pub async fn assign_custom_role(
        &self,
        actor: &AuthenticatedUser,
        input: AssignCustomRoleInput,
    ) -> AppResult<UserCustomRole> {
        let target = self.administered_user(actor, input.user_id).await?;

        let custom_role = self
            .repository
            .find_custom_role(input.custom_role_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("custom role '{}' not found", input.custom_role_id))
            })?;

        if !custom_role.is_usable() {
            return Err(AppError::Conflict(format!(
                "custom role '{}' is inactive",
                custom_role.name
            )));
        }

        if custom_role
            .organization_id
            .is_some_and(|organization_id| target.organization_id != Some(organization_id))
        {
            return Err(AppError::Validation(format!(
                "custom role '{}' belongs to another organization",
                custom_role.name
            )));
        }

        self.require_delegable(actor, custom_role.granted_permission_strings().collect())
            .await?;

        if input
            .expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
        {
            return Err(AppError::Validation(
                "assignment expiry must be in the future".to_owned(),
            ));
        }

        let user_id = input.user_id;
        let assignment = self
            .repository
            .upsert_custom_role_assignment(input, actor.id())
            .await?;
        self.authorization_service.clear_cache(user_id).await?;

        info!(
            actor_id = %actor.id(),
            %user_id,
            custom_role = %custom_role.name,
            "assigned custom role"
        );
        Ok(assignment)
    }

    /// Deactivates a custom role assignment.
    pub async fn revoke_custom_role(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<()> {
        self.administered_user(actor, user_id).await?;

        if !self
            .repository
            .deactivate_custom_role_assignment(user_id, custom_role_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "custom role '{custom_role_id}' is not assigned to user '{user_id}'"
            )));
        }
        self.authorization_service.clear_cache(user_id).await?;

        info!(actor_id = %actor.id(), %user_id, %custom_role_id, "revoked custom role");
        Ok(())
    }

    /// Records a direct grant or denial for a user.
    pub async fn set_user_permission(
        &self,
        actor: &AuthenticatedUser,
        input: SetUserPermissionInput,
    ) -> AppResult<()> {
        self.administered_user(actor, input.user_id).await?;

        let permission = self
            .repository
            .find_permission(input.permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{}' not found", input.permission_id))
            })?;

        if input.granted {
            self.require_delegable(actor, vec![permission.permission_string()])
                .await?;
        }

        if input
            .expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
        {
            return Err(AppError::Validation(
                "permission expiry must be in the future".to_owned(),
            ));
        }

        let user_id = input.user_id;
        let granted = input.granted;
        self.repository.upsert_user_permission(input).await?;
        self.authorization_service.clear_cache(user_id).await?;

        info!(
            actor_id = %actor.id(),
            %user_id,
            permission = %permission.permission_string(),
            granted,
            "set direct user permission"
        );
        Ok(())
    }

    /// Deletes a direct permission override.
    pub async fn remove_user_permission(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.administered_user(actor, user_id).await?;

        if !self
            .repository
            .delete_user_permission(user_id, permission_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' is not set for user '{user_id}'"
            )));
        }
        self.authorization_service.clear_cache(user_id).await?;

        info!(actor_id = %actor.id(), %user_id, %permission_id, "removed direct user permission");
        Ok(())
    }

    /// Counts users per system role within the actor's tenant breadth.
    ///
    /// `request_filter` carries constraints an upstream gate already
    /// derived and is merged into the actor's own. Every role is listed,
    /// including those nobody holds.
    pub async fn role_statistics(
        &self,
        actor: &AuthenticatedUser,
        request_filter: Option<&ScopeFilter>,
    ) -> AppResult<RoleStatistics> {
        let granted = self.require_user_permission(actor, "read", None).await?;
        let scope_filters = match (granted, request_filter) {
            (Some(granted), Some(requested)) => Some(granted.merge(requested)),
            (granted, requested) => granted.or_else(|| requested.cloned()),
        };
        let counts = self
            .repository
            .count_users_by_role(scope_filters.as_ref())
            .await?;

        let roles = Role::all()
            .iter()
            .map(|role| RoleCount {
                role: *role,
                user_count: counts
                    .iter()
                    .find(|count| count.role == *role)
                    .map_or(0, |count| count.user_count),
            })
            .collect();

        Ok(RoleStatistics {
            scope_filters,
            roles,
        })
    }

    // Loads a user the actor may administer: someone else, inside the
    // actor's tenant breadth and strictly below the actor's role.
    async fn administered_user(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
    ) -> AppResult<ManagedUser> {
        let target = self.managed_user(user_id).await?;
        self.require_user_permission(actor, "update", Some(&target))
            .await?;

        if actor.id() == user_id {
            return Err(AppError::Forbidden(
                "users cannot administer their own access".to_owned(),
            ));
        }

        if !self
            .authorization_service
            .can_assign_role(actor.role(), target.role)
        {
            return Err(AppError::Forbidden(format!(
                "role '{}' cannot administer users holding role '{}'",
                actor.role(),
                target.role
            )));
        }

        Ok(target)
    }

    async fn require_delegable(
        &self,
        actor: &AuthenticatedUser,
        permissions: Vec<String>,
    ) -> AppResult<()> {
        for permission in permissions {
            if !self
                .authorization_service
                .can_delegate(actor, &permission)
                .await
            {
                return Err(AppError::Forbidden(format!(
                    "role '{}' cannot grant '{permission}' because it does not hold it",
                    actor.role()
                )));
            }
        }

        Ok(())
    }

    async fn managed_user(&self, user_id: UserId) -> AppResult<ManagedUser> {
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    // Requires `user.<action>.<breadth>` where breadth is the actor's own
    // tenant level, and the target inside that tenant.
    async fn require_user_permission(
        &self,
        actor: &AuthenticatedUser,
        action: &str,
        target: Option<&ManagedUser>,
    ) -> AppResult<Option<ScopeFilter>> {
        let scope = actor.role().legacy_scope();
        let requirement = PermissionRequirement::new(PermissionKey::new("user", action, scope)?)
            .with_conditions(tenant_conditions(scope));

        let context = match target {
            Some(target) => PermissionContext {
                user: Some(actor.clone()),
                organization_id: target.organization_id,
                property_id: target.property_id,
                department_id: target.department_id,
                resource_owner_id: Some(target.user_id),
            },
            None => PermissionContext {
                user: Some(actor.clone()),
                organization_id: actor.organization_id(),
                property_id: actor.property_id(),
                department_id: actor.department_id(),
                resource_owner_id: Some(actor.id()),
            },
        };

        self.authorization_service
            .require(&requirement, &context)
            .await
    }
}

fn tenant_conditions(scope: PermissionScope) -> PermissionConditions {
    let mut conditions = PermissionConditions::default();
    match scope {
        PermissionScope::Platform => {}
        PermissionScope::Organization => conditions.same_organization = true,
        PermissionScope::Property => conditions.same_property = true,
        PermissionScope::Department => conditions.same_department = true,
        PermissionScope::Own => conditions.is_owner = true,
    }

    conditions
}
