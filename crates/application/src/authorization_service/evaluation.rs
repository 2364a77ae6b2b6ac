use innkeep_core::AppResult;
use innkeep_domain::{
    AuthenticatedUser, CustomCondition, GrantedPermission, PermissionContext, PermissionKey,
    PermissionRequirement, RequirementInput, ScopeFilter, normalize_requirement,
};
use tracing::{debug, warn};

use super::conditions::{unmet_condition, unmet_custom_condition};
use super::{AuthorizationService, PermissionDecision};

const AUTHENTICATION_REQUIRED: &str = "authentication required";

impl AuthorizationService {
    /// Evaluates one requirement against the request context.
    ///
    /// Never fails: internal errors become denials whose reason starts with
    /// `evaluation error:`.
    pub async fn evaluate(
        &self,
        requirement: &PermissionRequirement,
        context: &PermissionContext,
    ) -> PermissionDecision {
        match self.try_evaluate(requirement, context).await {
            Ok(decision) => decision,
            Err(error) => {
                warn!(%requirement, %error, "permission evaluation failed, denying");
                PermissionDecision::denied(format!("evaluation error: {error}"))
            }
        }
    }

    /// Normalizes a declared requirement and evaluates it.
    pub async fn evaluate_input(
        &self,
        input: impl Into<RequirementInput>,
        context: &PermissionContext,
    ) -> PermissionDecision {
        match normalize_requirement(input) {
            Ok(requirement) => self.evaluate(&requirement, context).await,
            Err(error) => PermissionDecision::denied(format!("invalid requirement: {error}")),
        }
    }

    /// Grants when any requirement is granted, checking them in order.
    pub async fn evaluate_any(
        &self,
        requirements: &[PermissionRequirement],
        context: &PermissionContext,
    ) -> PermissionDecision {
        let mut reasons = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            let decision = self.evaluate(requirement, context).await;
            if decision.granted {
                return decision;
            }

            reasons.push(format!(
                "{requirement}: {}",
                decision.reason.unwrap_or_default()
            ));
        }

        if reasons.is_empty() {
            return PermissionDecision::denied("no permission requirements were supplied");
        }

        PermissionDecision::denied(format!(
            "none of the requirements were granted ({})",
            reasons.join("; ")
        ))
    }

    /// Grants when every requirement is granted.
    ///
    /// Scope filters come from the first requirement.
    pub async fn evaluate_all(
        &self,
        requirements: &[PermissionRequirement],
        context: &PermissionContext,
    ) -> PermissionDecision {
        let mut first_decision: Option<PermissionDecision> = None;
        for requirement in requirements {
            let decision = self.evaluate(requirement, context).await;
            if !decision.granted {
                return decision;
            }

            first_decision.get_or_insert(decision);
        }

        first_decision.unwrap_or_else(|| {
            PermissionDecision::denied("no permission requirements were supplied")
        })
    }

    /// Evaluates a base requirement and then a custom predicate.
    pub async fn evaluate_conditional(
        &self,
        base: &PermissionRequirement,
        predicate: &CustomCondition,
        context: &PermissionContext,
    ) -> PermissionDecision {
        let decision = self.evaluate(base, context).await;
        if !decision.granted {
            return decision;
        }

        match unmet_custom_condition(predicate, context) {
            Ok(None) => decision,
            Ok(Some(reason)) => PermissionDecision::denied(reason),
            Err(error) => {
                warn!(requirement = %base, %error, "conditional requirement failed, denying");
                PermissionDecision::denied(format!("evaluation error: {error}"))
            }
        }
    }

    /// Evaluates a requirement and converts a denial into a forbidden error.
    pub async fn require(
        &self,
        requirement: &PermissionRequirement,
        context: &PermissionContext,
    ) -> AppResult<Option<ScopeFilter>> {
        self.evaluate(requirement, context).await.into_result()
    }

    /// Returns whether `user` may hand `permission` to someone else.
    ///
    /// Concrete permissions must evaluate as granted for the user. Wildcard
    /// grants can only be delegated by the top administrative role.
    pub async fn can_delegate(&self, user: &AuthenticatedUser, permission: &str) -> bool {
        let Ok(granted) = GrantedPermission::parse(permission) else {
            return false;
        };
        if granted.scope().is_none() {
            return false;
        }

        match PermissionKey::parse(permission) {
            Ok(key) => {
                self.evaluate(
                    &PermissionRequirement::new(key),
                    &PermissionContext::for_user(user.clone()),
                )
                .await
                .granted
            }
            Err(_) => user.role().is_top_administrative(),
        }
    }

    async fn try_evaluate(
        &self,
        requirement: &PermissionRequirement,
        context: &PermissionContext,
    ) -> AppResult<PermissionDecision> {
        let Some(user) = context.user.as_ref() else {
            return Ok(PermissionDecision::denied(AUTHENTICATION_REQUIRED));
        };

        let permissions = self.permissions_for(user).await;
        let key = requirement.key();
        let matched = permissions
            .iter()
            .filter_map(|permission| GrantedPermission::parse(permission).ok())
            .any(|granted| granted.satisfies(key));

        if !matched {
            let legacy = user.role().legacy_permissions();
            let has_custom_permissions = permissions
                .iter()
                .any(|permission| !legacy.contains(&permission.as_str()));
            debug!(user_id = %user.id(), %requirement, "no effective permission matched");
            return Ok(PermissionDecision::denied(format!(
                "role '{}' (custom permissions: {has_custom_permissions}) lacks permission '{requirement}'",
                user.role()
            )));
        }

        if let Some(reason) = self
            .narrowing_rules
            .iter()
            .find_map(|rule| {
                rule.restrict(user, key)
                    .map(|reason| format!("{}: {reason}", rule.name()))
            })
        {
            debug!(user_id = %user.id(), %requirement, "matched permission narrowed by policy");
            return Ok(PermissionDecision::denied(reason));
        }

        let scope_filters = ScopeFilter::for_grant(requirement.scope(), user);
        if !user.role().is_top_administrative()
            && scope_filters
                .as_ref()
                .is_some_and(|filter| !filter.anchors(requirement.scope()))
        {
            warn!(
                user_id = %user.id(),
                %requirement,
                "granted scope has no tenant placement to filter on, denying"
            );
            return Ok(PermissionDecision::denied(format!(
                "user has no {} placement to apply '{requirement}' to",
                requirement.scope()
            )));
        }

        if let Some(conditions) = requirement.conditions()
            && let Some(reason) = unmet_condition(conditions, user, context)?
        {
            return Ok(PermissionDecision::denied(reason));
        }

        Ok(PermissionDecision::granted(scope_filters))
    }

    // The top administrative role keeps its legacy set even when resolution
    // failed and returned nothing.
    async fn permissions_for(&self, user: &AuthenticatedUser) -> Vec<String> {
        let mut permissions = self.resolver.effective_permissions(user).await;
        if user.role().is_top_administrative() {
            for legacy in user.role().legacy_permissions() {
                if !permissions.iter().any(|permission| permission.as_str() == *legacy) {
                    permissions.push((*legacy).to_owned());
                }
            }
        }

        permissions
    }
}
