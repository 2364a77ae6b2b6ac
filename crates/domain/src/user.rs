//! Authenticated user as seen by authorization checks.

use innkeep_core::{DepartmentId, OrganizationId, PropertyId, UserId};
use serde::{Deserialize, Serialize};

use crate::role::{Role, UserType};

/// Acting user populated by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    id: UserId,
    role: Role,
    user_type: UserType,
    organization_id: Option<OrganizationId>,
    property_id: Option<PropertyId>,
    department_id: Option<DepartmentId>,
}

impl AuthenticatedUser {
    /// Creates a user without tenant placement; the user type follows the role.
    #[must_use]
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            user_type: role.user_type(),
            organization_id: None,
            property_id: None,
            department_id: None,
        }
    }

    /// Places the user inside an organization.
    #[must_use]
    pub fn with_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Places the user inside a property.
    #[must_use]
    pub fn with_property(mut self, property_id: PropertyId) -> Self {
        self.property_id = Some(property_id);
        self
    }

    /// Places the user inside a department.
    #[must_use]
    pub fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    /// Overrides the user type stored on the account.
    #[must_use]
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the system role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the user classification.
    #[must_use]
    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    /// Returns the organization, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Returns the property, if any.
    #[must_use]
    pub fn property_id(&self) -> Option<PropertyId> {
        self.property_id
    }

    /// Returns the department, if any.
    #[must_use]
    pub fn department_id(&self) -> Option<DepartmentId> {
        self.department_id
    }
}
