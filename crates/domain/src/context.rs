//! Per-request authorization context and the scope filters derived from it.

use innkeep_core::{DepartmentId, OrganizationId, PropertyId, UserId};
use serde::Serialize;

use crate::scope::PermissionScope;
use crate::user::AuthenticatedUser;

/// Acting user plus the tenant identifiers targeted by one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionContext {
    /// Authenticated user, if authentication succeeded.
    pub user: Option<AuthenticatedUser>,
    /// Organization targeted by the request.
    pub organization_id: Option<OrganizationId>,
    /// Property targeted by the request.
    pub property_id: Option<PropertyId>,
    /// Department targeted by the request.
    pub department_id: Option<DepartmentId>,
    /// Owner of the targeted resource.
    pub resource_owner_id: Option<UserId>,
}

impl PermissionContext {
    /// Creates a context for a user with no request targets.
    #[must_use]
    pub fn for_user(user: AuthenticatedUser) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    /// Sets the targeted organization.
    #[must_use]
    pub fn with_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Sets the targeted property.
    #[must_use]
    pub fn with_property(mut self, property_id: PropertyId) -> Self {
        self.property_id = Some(property_id);
        self
    }

    /// Sets the targeted department.
    #[must_use]
    pub fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    /// Sets the owner of the targeted resource.
    #[must_use]
    pub fn with_resource_owner(mut self, owner_id: UserId) -> Self {
        self.resource_owner_id = Some(owner_id);
        self
    }
}

/// Tenant constraints a data query must apply to honour the granted scope.
///
/// The filter is advisory: the evaluator never filters rows itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeFilter {
    /// Restrict to rows owned by this user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Restrict to this organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    /// Restrict to this property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<PropertyId>,
    /// Restrict to this department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
}

impl ScopeFilter {
    /// Builds the filter for access granted at `scope` to `user`.
    ///
    /// Returns `None` for platform scope, which is unrestricted.
    #[must_use]
    pub fn for_grant(scope: PermissionScope, user: &AuthenticatedUser) -> Option<Self> {
        let filter = match scope {
            PermissionScope::Platform => return None,
            PermissionScope::Organization => Self {
                organization_id: user.organization_id(),
                ..Self::default()
            },
            PermissionScope::Property => Self {
                organization_id: user.organization_id(),
                property_id: user.property_id(),
                ..Self::default()
            },
            PermissionScope::Department => Self {
                organization_id: user.organization_id(),
                property_id: user.property_id(),
                department_id: user.department_id(),
                user_id: None,
            },
            PermissionScope::Own => Self {
                user_id: Some(user.id()),
                organization_id: user.organization_id(),
                property_id: user.property_id(),
                department_id: user.department_id(),
            },
        };

        Some(filter)
    }

    /// Returns whether no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns whether the filter pins the tenant identifier `scope` relies on.
    #[must_use]
    pub fn anchors(&self, scope: PermissionScope) -> bool {
        match scope {
            PermissionScope::Platform => true,
            PermissionScope::Organization => self.organization_id.is_some(),
            PermissionScope::Property => self.property_id.is_some(),
            PermissionScope::Department => self.department_id.is_some(),
            PermissionScope::Own => self.user_id.is_some(),
        }
    }

    /// Combines two filters, keeping every constraint either of them sets.
    ///
    /// Where both constrain the same field, `self` wins.
    #[must_use]
    pub fn merge(self, other: &Self) -> Self {
        Self {
            user_id: self.user_id.or(other.user_id),
            organization_id: self.organization_id.or(other.organization_id),
            property_id: self.property_id.or(other.property_id),
            department_id: self.department_id.or(other.department_id),
        }
    }
}
