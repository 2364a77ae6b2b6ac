//! Permission catalog entries and their assignment to users.

use chrono::{DateTime, Utc};
use innkeep_core::{CustomRoleId, OrganizationId, PermissionId, PropertyId, UserId};
use serde::{Deserialize, Serialize};

use crate::permission::normalize_segment;

/// Permission catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Stable permission identifier.
    pub permission_id: PermissionId,
    /// Resource segment.
    pub resource: String,
    /// Action segment.
    pub action: String,
    /// Scope token.
    pub scope: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

impl PermissionDefinition {
    /// Returns the normalized `resource.action.scope` key.
    #[must_use]
    pub fn permission_string(&self) -> String {
        format!(
            "{}.{}.{}",
            normalize_segment(&self.resource),
            normalize_segment(&self.action),
            normalize_segment(&self.scope)
        )
    }
}

/// Permission attached to a custom role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRolePermission {
    /// Catalog entry.
    pub permission: PermissionDefinition,
    /// Only granted entries contribute to effective permissions.
    pub granted: bool,
}

/// Tenant-defined bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRole {
    /// Stable role identifier.
    pub custom_role_id: CustomRoleId,
    /// Role name, unique within its tenant.
    pub name: String,
    /// Owning organization.
    pub organization_id: Option<OrganizationId>,
    /// Owning property.
    pub property_id: Option<PropertyId>,
    /// Seeded by the platform rather than a tenant administrator.
    pub is_system_role: bool,
    /// Inactive roles grant nothing.
    pub is_active: bool,
    /// Loose equivalent of a system role level.
    pub priority: i32,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Attached permissions.
    pub permissions: Vec<CustomRolePermission>,
}

impl CustomRole {
    /// Returns whether the role itself can grant anything.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Returns the permission strings granted by this role.
    pub fn granted_permission_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.permissions
            .iter()
            .filter(|entry| entry.granted)
            .map(|entry| entry.permission.permission_string())
    }
}

/// Assignment of a custom role to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCustomRole {
    /// Assigned user.
    pub user_id: UserId,
    /// Assigned role with its permissions.
    pub custom_role: CustomRole,
    /// Deactivated assignments are kept for history.
    pub is_active: bool,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Administrator who made the assignment.
    pub assigned_by: Option<UserId>,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Free-form assignment conditions.
    pub conditions: Option<serde_json::Value>,
    /// Free-form assignment metadata.
    pub metadata: Option<serde_json::Value>,
}

impl UserCustomRole {
    /// Returns whether the assignment contributes permissions at `now`.
    #[must_use]
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.custom_role.is_usable()
            && is_unexpired(self.expires_at, now)
    }
}

/// Direct permission override for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermission {
    /// Affected user.
    pub user_id: UserId,
    /// Catalog entry.
    pub permission: PermissionDefinition,
    /// `true` adds the permission, `false` removes the exact string.
    pub granted: bool,
    /// Deactivated overrides are kept for history.
    pub is_active: bool,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserPermission {
    /// Returns whether the override applies at `now`.
    #[must_use]
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && is_unexpired(self.expires_at, now)
    }
}

fn is_unexpired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_none_or(|expires_at| expires_at > now)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use innkeep_core::{CustomRoleId, PermissionId, UserId};

    use super::*;

    fn definition(value: &str) -> PermissionDefinition {
        let mut segments = value.split('.');
        PermissionDefinition {
            permission_id: PermissionId::new(),
            resource: segments.next().unwrap_or_default().to_owned(),
            action: segments.next().unwrap_or_default().to_owned(),
            scope: segments.next().unwrap_or_default().to_owned(),
            name: None,
            description: None,
        }
    }

    fn role(permissions: Vec<CustomRolePermission>) -> CustomRole {
        CustomRole {
            custom_role_id: CustomRoleId::new(),
            name: "night-audit".to_owned(),
            organization_id: None,
            property_id: None,
            is_system_role: false,
            is_active: true,
            priority: 5,
            deleted_at: None,
            permissions,
        }
    }

    #[test]
    fn catalog_keys_are_normalized() {
        let mut entry = definition("Document.READ.property");
        entry.scope = " Property ".to_owned();

        assert_eq!(entry.permission_string(), "document.read.property");
    }

    #[test]
    fn only_granted_role_entries_are_listed() {
        let role = role(vec![
            CustomRolePermission {
                permission: definition("reservation.read.property"),
                granted: true,
            },
            CustomRolePermission {
                permission: definition("payroll.read.property"),
                granted: false,
            },
        ]);

        let permissions: Vec<String> = role.granted_permission_strings().collect();
        assert_eq!(permissions, vec!["reservation.read.property".to_owned()]);
    }

    #[test]
    fn expired_assignment_is_not_effective_even_when_active() {
        let now = Utc::now();
        let assignment = UserCustomRole {
            user_id: UserId::new(),
            custom_role: role(Vec::new()),
            is_active: true,
            expires_at: Some(now - Duration::minutes(1)),
            assigned_by: None,
            assigned_at: now - Duration::days(3),
            conditions: None,
            metadata: None,
        };

        assert!(!assignment.is_effective_at(now));
    }

    #[test]
    fn soft_deleted_role_makes_assignment_ineffective() {
        let now = Utc::now();
        let mut deleted = role(Vec::new());
        deleted.deleted_at = Some(now);
        let assignment = UserCustomRole {
            user_id: UserId::new(),
            custom_role: deleted,
            is_active: true,
            expires_at: None,
            assigned_by: None,
            assigned_at: now,
            conditions: None,
            metadata: None,
        };

        assert!(!assignment.is_effective_at(now));
    }

    #[test]
    fn direct_permission_without_expiry_is_effective() {
        let permission = UserPermission {
            user_id: UserId::new(),
            permission: definition("document.read.property"),
            granted: false,
            is_active: true,
            expires_at: None,
        };

        assert!(permission.is_effective_at(Utc::now()));
    }
}
