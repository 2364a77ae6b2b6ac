use std::fmt::{Display, Formatter};
use std::str::FromStr;

use innkeep_core::AppError;
use serde::{Deserialize, Serialize};

/// Tenancy breadth at which a permission applies, ordered from narrowest to
/// broadest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Only records owned by the acting user.
    Own,
    /// Records inside the acting user's department.
    Department,
    /// Records inside the acting user's property.
    Property,
    /// Records inside the acting user's organization.
    Organization,
    /// Every record on the platform.
    Platform,
}

impl PermissionScope {
    /// Returns the storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Department => "department",
            Self::Property => "property",
            Self::Organization => "organization",
            Self::Platform => "platform",
        }
    }

    /// Returns every scope from narrowest to broadest.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionScope] = &[
            PermissionScope::Own,
            PermissionScope::Department,
            PermissionScope::Property,
            PermissionScope::Organization,
            PermissionScope::Platform,
        ];

        ALL
    }

    /// Position in the hierarchy; higher means broader.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Own => 0,
            Self::Department => 1,
            Self::Property => 2,
            Self::Organization => 3,
            Self::Platform => 4,
        }
    }

    /// Returns whether a grant at this scope satisfies a requirement at `required`.
    #[must_use]
    pub fn covers(&self, required: PermissionScope) -> bool {
        self.rank() >= required.rank()
    }
}

impl Display for PermissionScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PermissionScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "own" => Ok(Self::Own),
            "department" => Ok(Self::Department),
            "property" => Ok(Self::Property),
            "organization" => Ok(Self::Organization),
            // `all` is the legacy spelling of the top of the hierarchy.
            "platform" | "all" => Ok(Self::Platform),
            _ => Err(AppError::Validation(format!(
                "unknown permission scope '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::PermissionScope;

    #[test]
    fn all_is_an_alias_for_platform() {
        assert_eq!(PermissionScope::from_str("all"), Ok(PermissionScope::Platform));
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(PermissionScope::from_str("region").is_err());
    }

    #[test]
    fn hierarchy_is_ordered_narrowest_first() {
        let ranks: Vec<u8> = PermissionScope::all()
            .iter()
            .map(PermissionScope::rank)
            .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
        assert!(PermissionScope::Organization.covers(PermissionScope::Department));
        assert!(!PermissionScope::Department.covers(PermissionScope::Organization));
    }
}
