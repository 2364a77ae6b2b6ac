//! Permission string grammar and matching.
//!
//! Permissions travel as `"<resource>.<action>.<scope>"`. Required permissions
//! are always concrete; granted permissions may use `*` in the resource or
//! action segment.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use innkeep_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::condition::PermissionConditions;
use crate::scope::PermissionScope;

/// Wildcard segment accepted in granted permissions.
pub const WILDCARD: &str = "*";

const SEGMENT_SEPARATOR: char = '.';

/// Concrete permission a caller must hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    resource: String,
    action: String,
    scope: PermissionScope,
}

impl PermissionKey {
    /// Creates a validated required permission.
    pub fn new(
        resource: impl AsRef<str>,
        action: impl AsRef<str>,
        scope: PermissionScope,
    ) -> AppResult<Self> {
        Ok(Self {
            resource: required_segment("resource", resource.as_ref())?,
            action: required_segment("action", action.as_ref())?,
            scope,
        })
    }

    /// Parses the compact `resource.action.scope` form.
    pub fn parse(value: &str) -> AppResult<Self> {
        let [resource, action, scope] = split_segments(value)?;
        let scope = PermissionScope::from_str(normalize_segment(scope).as_str())?;
        Self::new(resource, action, scope)
    }

    /// Returns the resource segment.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the action segment.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns the required scope.
    #[must_use]
    pub fn scope(&self) -> PermissionScope {
        self.scope
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}.{}.{}",
            self.resource,
            self.action,
            self.scope.as_str()
        )
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Permission held by a user, possibly with wildcard segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantedPermission {
    resource: String,
    action: String,
    scope: Option<PermissionScope>,
}

impl GrantedPermission {
    /// Parses a granted permission string.
    ///
    /// Unknown scope tokens are accepted but leave the grant outside the
    /// hierarchy, so it never satisfies any requirement.
    pub fn parse(value: &str) -> AppResult<Self> {
        let [resource, action, scope] = split_segments(value)?;
        Ok(Self {
            resource: normalize_segment(resource),
            action: normalize_segment(action),
            scope: PermissionScope::from_str(normalize_segment(scope).as_str()).ok(),
        })
    }

    /// Returns the scope if the token is part of the hierarchy.
    #[must_use]
    pub fn scope(&self) -> Option<PermissionScope> {
        self.scope
    }

    /// Returns whether this grant satisfies the required permission.
    #[must_use]
    pub fn satisfies(&self, required: &PermissionKey) -> bool {
        let Some(scope) = self.scope else {
            return false;
        };

        segment_matches(self.resource.as_str(), required.resource())
            && segment_matches(self.action.as_str(), required.action())
            && scope.covers(required.scope())
    }
}

impl FromStr for GrantedPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Matches a required permission string against one granted permission string.
///
/// Malformed input on either side never matches.
#[must_use]
pub fn permission_matches(required: &str, granted: &str) -> bool {
    let Ok(required) = PermissionKey::parse(required) else {
        return false;
    };

    GrantedPermission::parse(granted).is_ok_and(|granted| granted.satisfies(&required))
}

/// Returns whether a permission string has exactly three non-empty segments.
#[must_use]
pub fn is_well_formed(value: &str) -> bool {
    split_segments(value).is_ok()
}

/// Normalized requirement attached to an operation or evaluated on demand.
#[derive(Debug, Clone)]
pub struct PermissionRequirement {
    key: PermissionKey,
    conditions: Option<PermissionConditions>,
}

impl PermissionRequirement {
    /// Creates a requirement without auxiliary conditions.
    #[must_use]
    pub fn new(key: PermissionKey) -> Self {
        Self {
            key,
            conditions: None,
        }
    }

    /// Parses the compact `resource.action.scope` form.
    pub fn parse(value: &str) -> AppResult<Self> {
        PermissionKey::parse(value).map(Self::new)
    }

    /// Attaches auxiliary conditions. Empty condition sets are dropped.
    #[must_use]
    pub fn with_conditions(mut self, conditions: PermissionConditions) -> Self {
        self.conditions = (!conditions.is_empty()).then_some(conditions);
        self
    }

    /// Returns the required permission.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the required scope.
    #[must_use]
    pub fn scope(&self) -> PermissionScope {
        self.key.scope()
    }

    /// Returns the auxiliary conditions, if any.
    #[must_use]
    pub fn conditions(&self) -> Option<&PermissionConditions> {
        self.conditions.as_ref()
    }
}

impl Display for PermissionRequirement {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.key, formatter)
    }
}

/// Requirement as declared by a caller, before normalization.
#[derive(Debug, Clone)]
pub enum RequirementInput {
    /// Separate resource, action and scope fields.
    Structured {
        /// Resource segment.
        resource: String,
        /// Action segment.
        action: String,
        /// Scope token.
        scope: String,
        /// Optional auxiliary conditions.
        conditions: Option<PermissionConditions>,
    },
    /// `resource.action.scope` string.
    Compact(String),
}

impl From<&str> for RequirementInput {
    fn from(value: &str) -> Self {
        Self::Compact(value.to_owned())
    }
}

impl From<String> for RequirementInput {
    fn from(value: String) -> Self {
        Self::Compact(value)
    }
}

/// Normalizes a declared requirement into its validated form.
pub fn normalize_requirement(input: impl Into<RequirementInput>) -> AppResult<PermissionRequirement> {
    match input.into() {
        RequirementInput::Compact(value) => PermissionRequirement::parse(value.as_str()),
        RequirementInput::Structured {
            resource,
            action,
            scope,
            conditions,
        } => {
            let scope = normalize_segment(scope.as_str());
            if scope.is_empty() {
                return Err(AppError::Validation(
                    "permission requirement is missing scope".to_owned(),
                ));
            }

            let key = PermissionKey::new(resource, action, PermissionScope::from_str(&scope)?)?;
            let requirement = PermissionRequirement::new(key);
            Ok(match conditions {
                Some(conditions) => requirement.with_conditions(conditions),
                None => requirement,
            })
        }
    }
}

fn split_segments(value: &str) -> AppResult<[&str; 3]> {
    let mut segments = value.split(SEGMENT_SEPARATOR);
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(resource), Some(action), Some(scope), None)
            if [resource, action, scope]
                .iter()
                .all(|segment| !segment.trim().is_empty()) =>
        {
            Ok([resource, action, scope])
        }
        _ => Err(AppError::Validation(format!(
            "permission '{value}' must have exactly three non-empty segments"
        ))),
    }
}

pub(crate) fn normalize_segment(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn required_segment(name: &str, value: &str) -> AppResult<String> {
    let value = normalize_segment(value);
    if value.is_empty() {
        return Err(AppError::Validation(format!(
            "permission requirement is missing {name}"
        )));
    }

    if value.contains(WILDCARD) {
        return Err(AppError::Validation(format!(
            "wildcard is not allowed in a required permission {name}"
        )));
    }

    if value.contains(SEGMENT_SEPARATOR) {
        return Err(AppError::Validation(format!(
            "permission {name} '{value}' must not contain '.'"
        )));
    }

    Ok(value)
}

fn segment_matches(granted: &str, required: &str) -> bool {
    granted == WILDCARD || granted == required
}
