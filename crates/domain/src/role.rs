//! System roles and their static metadata.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use innkeep_core::AppError;
use serde::{Deserialize, Serialize};

use crate::scope::PermissionScope;

/// Classification of the people holding a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// Employees of an organization.
    Internal,
    /// Guests and customers.
    Client,
    /// External suppliers.
    Vendor,
}

impl UserType {
    /// Returns the stable storage value for this classification.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "INTERNAL",
            Self::Client => "CLIENT",
            Self::Vendor => "VENDOR",
        }
    }
}

impl FromStr for UserType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INTERNAL" => Ok(Self::Internal),
            "CLIENT" => Ok(Self::Client),
            "VENDOR" => Ok(Self::Vendor),
            _ => Err(AppError::Validation(format!("unknown user type '{value}'"))),
        }
    }
}

/// Fixed system role assigned directly to every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Operates the whole platform.
    PlatformAdmin,
    /// Owns an organization.
    OrganizationOwner,
    /// Administers an organization on behalf of the owner.
    OrganizationAdmin,
    /// Runs one property.
    PropertyManager,
    /// Administers one department.
    DepartmentAdmin,
    /// Regular employee.
    Staff,
    /// Guest or customer.
    Client,
    /// External supplier.
    Vendor,
}

/// Static metadata describing a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleInfo {
    /// Display name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Hierarchy level, higher is more privileged.
    pub level: u8,
    /// Classification of role holders.
    pub user_type: UserType,
    /// Human-readable capability summary.
    pub capabilities: &'static [&'static str],
}

/// Metadata returned for role values outside the known set.
pub const UNKNOWN_ROLE_INFO: RoleInfo = RoleInfo {
    name: "Unknown role",
    description: "Role value is not recognised and carries no privileges",
    level: 0,
    user_type: UserType::Client,
    capabilities: &[],
};

impl Role {
    /// Returns every system role, most privileged first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::PlatformAdmin,
            Role::OrganizationOwner,
            Role::OrganizationAdmin,
            Role::PropertyManager,
            Role::DepartmentAdmin,
            Role::Staff,
            Role::Client,
            Role::Vendor,
        ];

        ALL
    }

    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformAdmin => "platform-admin",
            Self::OrganizationOwner => "organization-owner",
            Self::OrganizationAdmin => "organization-admin",
            Self::PropertyManager => "property-manager",
            Self::DepartmentAdmin => "department-admin",
            Self::Staff => "staff",
            Self::Client => "client",
            Self::Vendor => "vendor",
        }
    }

    /// Returns the static metadata for this role.
    #[must_use]
    pub fn info(&self) -> RoleInfo {
        match self {
            Self::PlatformAdmin => RoleInfo {
                name: "Platform Administrator",
                description: "Full access to every organization on the platform",
                level: 10,
                user_type: UserType::Internal,
                capabilities: &[
                    "Manage all organizations",
                    "Manage platform settings",
                    "Assign any role",
                ],
            },
            Self::OrganizationOwner => RoleInfo {
                name: "Organization Owner",
                description: "Owns an organization and all of its properties",
                level: 9,
                user_type: UserType::Internal,
                capabilities: &[
                    "Manage organization settings and billing",
                    "Manage all properties and departments",
                    "Assign organization administrators",
                ],
            },
            Self::OrganizationAdmin => RoleInfo {
                name: "Organization Administrator",
                description: "Administers an organization on behalf of the owner",
                level: 8,
                user_type: UserType::Internal,
                capabilities: &[
                    "Manage properties and departments",
                    "Manage organization users",
                    "View organization reports",
                ],
            },
            Self::PropertyManager => RoleInfo {
                name: "Property Manager",
                description: "Runs day-to-day operations of one property",
                level: 7,
                user_type: UserType::Internal,
                capabilities: &[
                    "Manage property staff and departments",
                    "Approve vacations and payroll for the property",
                    "Manage reservations and vendors",
                ],
            },
            Self::DepartmentAdmin => RoleInfo {
                name: "Department Administrator",
                description: "Administers one department inside a property",
                level: 6,
                user_type: UserType::Internal,
                capabilities: &[
                    "Manage department staff",
                    "Approve department vacations",
                    "Read property-wide information",
                ],
            },
            Self::Staff => RoleInfo {
                name: "Staff",
                description: "Employee working inside a department",
                level: 4,
                user_type: UserType::Internal,
                capabilities: &[
                    "Read department documents and training",
                    "Request vacations",
                    "View own payroll",
                ],
            },
            Self::Client => RoleInfo {
                name: "Client",
                description: "Guest or customer of a property",
                level: 1,
                user_type: UserType::Client,
                capabilities: &["Manage own reservations", "Update own profile"],
            },
            Self::Vendor => RoleInfo {
                name: "Vendor",
                description: "External supplier working with a property",
                level: 1,
                user_type: UserType::Vendor,
                capabilities: &["Manage own vendor profile", "View assigned work orders"],
            },
        }
    }

    /// Returns the hierarchy level.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.info().level
    }

    /// Returns the user classification.
    #[must_use]
    pub fn user_type(&self) -> UserType {
        self.info().user_type
    }

    /// Returns whether this is the top administrative role.
    #[must_use]
    pub fn is_top_administrative(&self) -> bool {
        matches!(self, Self::PlatformAdmin)
    }

    /// Returns the fallback permission strings for this role.
    #[must_use]
    pub fn legacy_permissions(&self) -> &'static [&'static str] {
        match self {
            Self::PlatformAdmin => &["*.*.platform"],
            Self::OrganizationOwner | Self::OrganizationAdmin => &["*.*.organization"],
            Self::PropertyManager => &["*.*.property"],
            // Writes at property scope are removed again by the department
            // admin narrowing rule.
            Self::DepartmentAdmin => &["*.*.property"],
            Self::Staff => &[
                "document.read.department",
                "documents.read.department",
                "training.read.department",
                "user.read.department",
                "reservation.read.property",
                "vacation.create.own",
                "vacation.read.own",
                "vacation.update.own",
                "payroll.read.own",
                "profile.read.own",
                "profile.update.own",
            ],
            Self::Client => &[
                "reservation.create.own",
                "reservation.read.own",
                "reservation.update.own",
                "reservation.delete.own",
                "profile.read.own",
                "profile.update.own",
            ],
            Self::Vendor => &[
                "vendor.read.own",
                "vendor.update.own",
                "workorder.read.own",
                "workorder.update.own",
                "profile.read.own",
                "profile.update.own",
            ],
        }
    }

    /// Scope used when translating legacy role declarations into permissions.
    #[must_use]
    pub fn legacy_scope(&self) -> PermissionScope {
        match self {
            Self::PlatformAdmin => PermissionScope::Platform,
            Self::OrganizationOwner | Self::OrganizationAdmin => PermissionScope::Organization,
            Self::PropertyManager => PermissionScope::Property,
            Self::DepartmentAdmin | Self::Staff => PermissionScope::Department,
            Self::Client | Self::Vendor => PermissionScope::Own,
        }
    }

    /// Returns whether this role may assign `target` to someone.
    ///
    /// Only strictly lower levels are assignable, except for the top
    /// administrative role which may assign anything.
    #[must_use]
    pub fn can_assign(&self, target: Role) -> bool {
        self.is_top_administrative() || self.level() > target.level()
    }

    /// Returns every role this role may assign.
    #[must_use]
    pub fn assignable_roles(&self) -> Vec<Role> {
        Role::all()
            .iter()
            .copied()
            .filter(|target| self.can_assign(*target))
            .collect()
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Role::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| AppError::Validation(format!("unknown role '{value}'")))
    }
}

/// Returns metadata for a stored role value, or the unknown-role record.
#[must_use]
pub fn role_info_for(value: &str) -> RoleInfo {
    Role::from_str(value)
        .map(|role| role.info())
        .unwrap_or(UNKNOWN_ROLE_INFO)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn storage_values_parse_back() {
        for role in Role::all() {
            assert_eq!(Role::from_str(role.as_str()), Ok(*role));
        }
        assert_eq!(
            Role::from_str("PROPERTY_MANAGER"),
            Ok(Role::PropertyManager)
        );
    }

    #[test]
    fn stored_user_types_parse_case_insensitively() {
        for user_type in [UserType::Internal, UserType::Client, UserType::Vendor] {
            assert_eq!(UserType::from_str(user_type.as_str()), Ok(user_type));
        }
        assert_eq!(UserType::from_str(" vendor "), Ok(UserType::Vendor));
        assert!(UserType::from_str("contractor").is_err());
    }

    #[test]
    fn unknown_role_value_is_never_privileged() {
        let info = role_info_for("super-user");
        assert_eq!(info, UNKNOWN_ROLE_INFO);
        assert_eq!(info.level, 0);
        assert!(info.capabilities.is_empty());
    }

    #[test]
    fn roles_cannot_assign_their_own_level() {
        for role in Role::all() {
            assert_eq!(role.can_assign(*role), role.is_top_administrative());
        }
    }

    #[test]
    fn assignment_requires_strictly_higher_level() {
        assert!(!Role::PropertyManager.can_assign(Role::OrganizationAdmin));
        assert!(Role::OrganizationOwner.can_assign(Role::DepartmentAdmin));
        assert!(!Role::Client.can_assign(Role::Vendor));
        assert!(Role::PlatformAdmin.can_assign(Role::PlatformAdmin));
    }

    #[test]
    fn assignable_roles_are_filtered_by_level() {
        assert_eq!(
            Role::DepartmentAdmin.assignable_roles(),
            vec![Role::Staff, Role::Client, Role::Vendor]
        );
        assert_eq!(Role::PlatformAdmin.assignable_roles(), Role::all().to_vec());
        assert!(Role::Vendor.assignable_roles().is_empty());
    }

    #[test]
    fn every_legacy_permission_is_well_formed() {
        for role in Role::all() {
            for permission in role.legacy_permissions() {
                assert!(
                    crate::is_well_formed(permission),
                    "{permission} for {role} is malformed"
                );
            }
        }
    }
}
