use std::sync::Arc;

use innkeep_domain::{AuthenticatedUser, PermissionKey, PermissionScope, Role};

/// Policy that withholds a permission the matcher already accepted.
pub trait ScopeNarrowingRule: Send + Sync {
    /// Stable rule name used in denial reasons and logs.
    fn name(&self) -> &'static str;

    /// Returns a denial reason when the rule withholds `required` from `user`.
    fn restrict(&self, user: &AuthenticatedUser, required: &PermissionKey) -> Option<String>;
}

/// Department administrators may only read at property scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentAdminPropertyReadOnly;

impl DepartmentAdminPropertyReadOnly {
    /// Actions still allowed at property scope.
    pub const READ_ONLY_ACTIONS: &'static [&'static str] = &["read", "list", "view", "export"];
}

impl ScopeNarrowingRule for DepartmentAdminPropertyReadOnly {
    fn name(&self) -> &'static str {
        "department_admin_property_read_only"
    }

    fn restrict(&self, user: &AuthenticatedUser, required: &PermissionKey) -> Option<String> {
        let applies = user.role() == Role::DepartmentAdmin
            && required.scope() == PermissionScope::Property
            && !Self::READ_ONLY_ACTIONS.contains(&required.action());

        applies.then(|| {
            format!(
                "role '{}' is limited to read-only actions at property scope, '{}' was requested",
                user.role(),
                required
            )
        })
    }
}

pub(super) fn default_rules() -> Vec<Arc<dyn ScopeNarrowingRule>> {
    vec![Arc::new(DepartmentAdminPropertyReadOnly)]
}

#[cfg(test)]
mod tests {
    use innkeep_core::UserId;
    use innkeep_domain::{AuthenticatedUser, PermissionKey, Role};

    use super::{DepartmentAdminPropertyReadOnly, ScopeNarrowingRule};

    fn key(value: &str) -> PermissionKey {
        PermissionKey::parse(value).unwrap_or_else(|error| panic!("{error}"))
    }

    #[test]
    fn department_admin_writes_at_property_scope_are_withheld() {
        let user = AuthenticatedUser::new(UserId::new(), Role::DepartmentAdmin);
        let rule = DepartmentAdminPropertyReadOnly;

        assert!(rule.restrict(&user, &key("unit.update.property")).is_some());
        assert!(rule.restrict(&user, &key("unit.read.property")).is_none());
        assert!(rule.restrict(&user, &key("unit.update.department")).is_none());
    }

    #[test]
    fn other_roles_are_not_narrowed() {
        let user = AuthenticatedUser::new(UserId::new(), Role::PropertyManager);
        let rule = DepartmentAdminPropertyReadOnly;

        assert!(rule.restrict(&user, &key("unit.update.property")).is_none());
    }
}
