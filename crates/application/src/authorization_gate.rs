use std::sync::Arc;

use innkeep_core::{AppError, AppResult};
use innkeep_domain::{
    AuthenticatedUser, CustomCondition, PermissionContext, PermissionRequirement, Role,
    ScopeFilter,
};
use tracing::{debug, warn};

use crate::{AuthorizationService, PermissionDecision};

mod bridge;
mod request_scope;

pub use bridge::{LegacyPermissionBridge, NameInferenceBridge};
pub use request_scope::RequestScope;

/// One access rule attached to an operation.
#[derive(Debug, Clone)]
pub enum AccessDeclaration {
    /// Every requirement must be granted.
    AllOf(Vec<PermissionRequirement>),
    /// At least one requirement must be granted.
    AnyOf(Vec<PermissionRequirement>),
    /// A base requirement followed by a custom predicate.
    Conditional {
        /// Requirement checked first.
        base: PermissionRequirement,
        /// Predicate run against the request context once the base passes.
        predicate: CustomCondition,
    },
    /// Legacy allow-list of roles.
    Roles(Vec<Role>),
}

/// Access rules declared for one operation.
#[derive(Debug, Clone)]
pub struct OperationAccess {
    container: String,
    operation: String,
    declarations: Vec<AccessDeclaration>,
}

impl OperationAccess {
    /// Creates an operation without declarations, which the gate allows.
    #[must_use]
    pub fn new(container: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            operation: operation.into(),
            declarations: Vec::new(),
        }
    }

    /// Adds a declaration.
    #[must_use]
    pub fn with(mut self, declaration: AccessDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Requires a single permission.
    #[must_use]
    pub fn requires(self, requirement: PermissionRequirement) -> Self {
        self.with(AccessDeclaration::AllOf(vec![requirement]))
    }

    /// Requires any one of several permissions.
    #[must_use]
    pub fn requires_any(self, requirements: Vec<PermissionRequirement>) -> Self {
        self.with(AccessDeclaration::AnyOf(requirements))
    }

    /// Declares a legacy role allow-list.
    #[must_use]
    pub fn roles(self, roles: Vec<Role>) -> Self {
        self.with(AccessDeclaration::Roles(roles))
    }

    /// Name of the component owning the operation, e.g. `ReservationController`.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Operation name, e.g. `findAll`.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Declared rules in declaration order.
    #[must_use]
    pub fn declarations(&self) -> &[AccessDeclaration] {
        &self.declarations
    }
}

/// Gate behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Whether legacy declared-role checks are still honoured.
    pub legacy_roles_enabled: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            legacy_roles_enabled: true,
        }
    }
}

/// Result of a successful gate check, handed to the downstream handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedRequest {
    /// Context the decision was made against.
    pub context: PermissionContext,
    /// Tenant constraints the handler must merge into its own query.
    pub scope_filters: Option<ScopeFilter>,
}

/// Per-operation authorization checkpoint.
#[derive(Clone)]
pub struct AuthorizationGate {
    authorization_service: AuthorizationService,
    legacy_bridge: Option<Arc<dyn LegacyPermissionBridge>>,
    config: GateConfig,
}

impl AuthorizationGate {
    /// Creates a gate without a legacy bridge.
    #[must_use]
    pub fn new(authorization_service: AuthorizationService, config: GateConfig) -> Self {
        Self {
            authorization_service,
            legacy_bridge: None,
            config,
        }
    }

    /// Installs a strategy translating legacy role lists into requirements.
    #[must_use]
    pub fn with_legacy_bridge(mut self, bridge: Arc<dyn LegacyPermissionBridge>) -> Self {
        self.legacy_bridge = Some(bridge);
        self
    }

    /// Checks one request against the operation's declarations.
    ///
    /// Undeclared operations are allowed. A missing user yields
    /// `Unauthorized`, a denial yields `Forbidden` carrying the reason and a
    /// malformed tenant identifier yields `Validation`.
    pub async fn authorize(
        &self,
        access: &OperationAccess,
        user: Option<&AuthenticatedUser>,
        request: &RequestScope,
    ) -> AppResult<AuthorizedRequest> {
        if access.declarations.is_empty() {
            return Ok(AuthorizedRequest {
                context: PermissionContext {
                    user: user.cloned(),
                    ..PermissionContext::default()
                },
                scope_filters: None,
            });
        }

        let Some(user) = user else {
            warn!(
                container = access.container(),
                operation = access.operation(),
                "protected operation reached without an authenticated user"
            );
            return Err(AppError::Unauthorized("authentication required".to_owned()));
        };

        let context = request.permission_context(user.clone())?;
        let mut scope_filters: Option<Option<ScopeFilter>> = None;
        let mut declared_roles: Vec<Role> = Vec::new();

        for declaration in &access.declarations {
            let decision = match declaration {
                AccessDeclaration::AllOf(requirements) => {
                    self.authorization_service
                        .evaluate_all(requirements, &context)
                        .await
                }
                AccessDeclaration::AnyOf(requirements) => {
                    self.authorization_service
                        .evaluate_any(requirements, &context)
                        .await
                }
                AccessDeclaration::Conditional { base, predicate } => {
                    self.authorization_service
                        .evaluate_conditional(base, predicate, &context)
                        .await
                }
                AccessDeclaration::Roles(roles) => {
                    declared_roles.extend(roles.iter().copied());
                    continue;
                }
            };

            let filters = Self::accept(access, user, decision)?;
            scope_filters.get_or_insert(filters);
        }

        if !declared_roles.is_empty() {
            let filters = self.check_legacy_roles(access, user, &declared_roles, &context).await?;
            scope_filters.get_or_insert(filters);
        }

        debug!(
            user_id = %user.id(),
            container = access.container(),
            operation = access.operation(),
            "request authorized"
        );

        Ok(AuthorizedRequest {
            context,
            scope_filters: scope_filters.flatten(),
        })
    }

    async fn check_legacy_roles(
        &self,
        access: &OperationAccess,
        user: &AuthenticatedUser,
        roles: &[Role],
        context: &PermissionContext,
    ) -> AppResult<Option<ScopeFilter>> {
        if self.config.legacy_roles_enabled && roles.contains(&user.role()) {
            return Ok(None);
        }

        let Some(bridge) = self.legacy_bridge.as_ref() else {
            return Self::accept(
                access,
                user,
                PermissionDecision::denied(format!(
                    "role '{}' is not among the roles allowed for {}.{}",
                    user.role(),
                    access.container(),
                    access.operation()
                )),
            );
        };

        let requirements = bridge.translate(access, roles);
        if requirements.is_empty() {
            return Self::accept(
                access,
                user,
                PermissionDecision::denied(format!(
                    "{} could not derive permissions for {}.{}",
                    bridge.name(),
                    access.container(),
                    access.operation()
                )),
            );
        }

        debug!(
            bridge = bridge.name(),
            user_id = %user.id(),
            count = requirements.len(),
            "retrying legacy role declaration through permission bridge"
        );
        let decision = self
            .authorization_service
            .evaluate_any(&requirements, context)
            .await;
        Self::accept(access, user, decision)
    }

    fn accept(
        access: &OperationAccess,
        user: &AuthenticatedUser,
        decision: PermissionDecision,
    ) -> AppResult<Option<ScopeFilter>> {
        if !decision.granted {
            warn!(
                user_id = %user.id(),
                role = %user.role(),
                container = access.container(),
                operation = access.operation(),
                reason = decision.reason.as_deref().unwrap_or_default(),
                "access denied"
            );
        }

        decision.into_result()
    }
}
