use std::panic::{AssertUnwindSafe, catch_unwind};

use innkeep_core::{AppError, AppResult};
use innkeep_domain::{AuthenticatedUser, CustomCondition, PermissionConditions, PermissionContext};

/// Checks auxiliary conditions in a fixed order, stopping at the first failure.
///
/// Returns `Ok(Some(reason))` when a condition is unmet and `Err` when a custom
/// predicate could not be evaluated.
pub(super) fn unmet_condition(
    conditions: &PermissionConditions,
    user: &AuthenticatedUser,
    context: &PermissionContext,
) -> AppResult<Option<String>> {
    if conditions.same_organization
        && !same_target(user.organization_id(), context.organization_id)
    {
        return Ok(Some(
            "target organization does not match the user's organization".to_owned(),
        ));
    }

    if conditions.same_property && !same_target(user.property_id(), context.property_id) {
        return Ok(Some(
            "target property does not match the user's property".to_owned(),
        ));
    }

    if conditions.same_department && !same_target(user.department_id(), context.department_id) {
        return Ok(Some(
            "target department does not match the user's department".to_owned(),
        ));
    }

    if conditions.is_owner && context.resource_owner_id != Some(user.id()) {
        return Ok(Some("user does not own the target resource".to_owned()));
    }

    match &conditions.custom {
        Some(condition) => unmet_custom_condition(condition, context),
        None => Ok(None),
    }
}

/// Runs a custom predicate, treating both errors and panics as evaluation
/// failures.
pub(super) fn unmet_custom_condition(
    condition: &CustomCondition,
    context: &PermissionContext,
) -> AppResult<Option<String>> {
    let outcome = catch_unwind(AssertUnwindSafe(|| condition.evaluate(context))).map_err(|_| {
        AppError::Internal(format!("custom condition '{}' panicked", condition.name()))
    })?;

    match outcome {
        Ok(true) => Ok(None),
        Ok(false) => Ok(Some(format!(
            "custom condition '{}' was not satisfied",
            condition.name()
        ))),
        Err(error) => Err(AppError::Internal(format!(
            "custom condition '{}' failed: {error}",
            condition.name()
        ))),
    }
}

// Both sides must be known; an absent id never matches.
fn same_target<T: PartialEq>(user_value: Option<T>, target: Option<T>) -> bool {
    matches!((user_value, target), (Some(user_value), Some(target)) if user_value == target)
}
