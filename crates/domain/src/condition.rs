//! Auxiliary conditions attached to a permission requirement.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use innkeep_core::AppResult;

use crate::context::PermissionContext;

type Predicate = dyn Fn(&PermissionContext) -> AppResult<bool> + Send + Sync;

/// Named predicate evaluated against the request context.
#[derive(Clone)]
pub struct CustomCondition {
    name: String,
    predicate: Arc<Predicate>,
}

impl CustomCondition {
    /// Wraps a predicate under a name used in denial reasons.
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&PermissionContext) -> AppResult<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Returns the condition name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Runs the predicate.
    pub fn evaluate(&self, context: &PermissionContext) -> AppResult<bool> {
        (self.predicate)(context)
    }
}

impl Debug for CustomCondition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CustomCondition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Conditions checked after a permission matched.
#[derive(Debug, Clone, Default)]
pub struct PermissionConditions {
    /// Target department must equal the user's department.
    pub same_department: bool,
    /// Target property must equal the user's property.
    pub same_property: bool,
    /// Target organization must equal the user's organization.
    pub same_organization: bool,
    /// Target resource must be owned by the user.
    pub is_owner: bool,
    /// Arbitrary predicate.
    pub custom: Option<CustomCondition>,
}

impl PermissionConditions {
    /// Returns whether no condition is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.same_department
            && !self.same_property
            && !self.same_organization
            && !self.is_owner
            && self.custom.is_none()
    }
}
