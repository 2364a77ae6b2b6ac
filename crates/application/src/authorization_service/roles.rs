use innkeep_domain::{Role, RoleInfo, role_info_for};

use super::AuthorizationService;

impl AuthorizationService {
    /// Returns whether `acting` may assign `target`.
    #[must_use]
    pub fn can_assign_role(&self, acting: Role, target: Role) -> bool {
        acting.can_assign(target)
    }

    /// Lists the roles `acting` may assign.
    #[must_use]
    pub fn assignable_roles(&self, acting: Role) -> Vec<Role> {
        acting.assignable_roles()
    }

    /// Returns metadata for a stored role value.
    #[must_use]
    pub fn role_info(&self, role: &str) -> RoleInfo {
        role_info_for(role)
    }
}
