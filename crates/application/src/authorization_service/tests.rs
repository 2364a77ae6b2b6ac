use innkeep_core::{AppError, DepartmentId, UserId};
use innkeep_domain::{
    AuthenticatedUser, CustomCondition, PermissionConditions, PermissionContext,
    PermissionRequirement, Role, ScopeFilter,
};

use crate::test_support::{fixture, placed_user};

fn requirement(value: &str) -> PermissionRequirement {
    PermissionRequirement::parse(value).unwrap_or_else(|error| panic!("{error}"))
}

#[tokio::test]
async fn staff_reads_department_documents_through_legacy_fallback() {
    let fixture = fixture();
    let user = placed_user(Role::Staff);
    let context = PermissionContext::for_user(user.clone());

    let decision = fixture
        .service
        .evaluate(&requirement("document.read.department"), &context)
        .await;

    assert!(decision.granted);
    assert_eq!(
        decision.scope_filters,
        Some(ScopeFilter {
            user_id: None,
            organization_id: user.organization_id(),
            property_id: user.property_id(),
            department_id: user.department_id(),
        })
    );
}

#[tokio::test]
async fn department_admin_cannot_write_at_property_scope() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::DepartmentAdmin));

    let write = fixture
        .service
        .evaluate(&requirement("unit.update.property"), &context)
        .await;
    let read = fixture
        .service
        .evaluate(&requirement("unit.read.property"), &context)
        .await;

    assert!(!write.granted);
    assert!(
        write
            .reason
            .is_some_and(|reason| reason.starts_with("department_admin_property_read_only"))
    );
    assert!(read.granted);
}

#[tokio::test]
async fn direct_denial_overrides_custom_role_grant() {
    let fixture = fixture();
    let user = placed_user(Role::Staff);
    fixture
        .repository
        .add_custom_role(user.id(), &["reservation.create.property"], None)
        .await;
    fixture
        .repository
        .add_user_permission(user.id(), "reservation.create.property", false, None)
        .await;
    let context = PermissionContext::for_user(user.clone());

    let permissions = fixture.service.effective_permissions(&user).await;
    let decision = fixture
        .service
        .evaluate(&requirement("reservation.create.property"), &context)
        .await;

    assert!(!permissions.contains(&"reservation.create.property".to_owned()));
    assert!(!decision.granted);
}

#[tokio::test]
async fn platform_admin_without_assignments_is_granted_everything() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::PlatformAdmin));

    let decision = fixture
        .service
        .evaluate(&requirement("organization.delete.platform"), &context)
        .await;

    assert!(decision.granted);
    assert_eq!(decision.scope_filters, None);
}

#[tokio::test]
async fn role_assignment_rules_follow_hierarchy_levels() {
    let fixture = fixture();

    assert!(
        !fixture
            .service
            .can_assign_role(Role::PropertyManager, Role::OrganizationAdmin)
    );
    assert!(
        fixture
            .service
            .can_assign_role(Role::OrganizationOwner, Role::DepartmentAdmin)
    );
    assert_eq!(fixture.service.role_info("department-admin").level, 6);
    assert_eq!(fixture.service.role_info("night-porter").level, 0);
}

#[tokio::test]
async fn persistence_failure_denies_regular_roles() {
    let fixture = fixture();
    fixture.repository.set_failing(true);
    let user = placed_user(Role::PropertyManager);
    let context = PermissionContext::for_user(user.clone());

    let permissions = fixture.service.effective_permissions(&user).await;
    let decision = fixture
        .service
        .evaluate(&requirement("reservation.read.property"), &context)
        .await;

    assert!(permissions.is_empty());
    assert!(!decision.granted);
}

#[tokio::test]
async fn persistence_failure_keeps_platform_admin_safety_net() {
    let fixture = fixture();
    fixture.repository.set_failing(true);
    let context = PermissionContext::for_user(placed_user(Role::PlatformAdmin));

    let decision = fixture
        .service
        .evaluate(&requirement("payroll.read.organization"), &context)
        .await;

    assert!(decision.granted);
}

#[tokio::test]
async fn missing_user_is_denied() {
    let fixture = fixture();

    let decision = fixture
        .service
        .evaluate(
            &requirement("document.read.own"),
            &PermissionContext::default(),
        )
        .await;

    assert_eq!(decision.reason.as_deref(), Some("authentication required"));
}

#[tokio::test]
async fn denial_reason_names_role_and_requirement() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::Client));

    let decision = fixture
        .service
        .evaluate(&requirement("payroll.read.property"), &context)
        .await;

    assert_eq!(
        decision.reason.as_deref(),
        Some(
            "role 'client' (custom permissions: false) lacks permission 'payroll.read.property'"
        )
    );
}

#[tokio::test]
async fn evaluate_any_grants_on_first_match() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::Staff));

    let decision = fixture
        .service
        .evaluate_any(
            &[
                requirement("payroll.approve.property"),
                requirement("vacation.read.own"),
            ],
            &context,
        )
        .await;

    assert!(decision.granted);
    assert!(
        decision
            .scope_filters
            .is_some_and(|filter| filter.user_id.is_some())
    );
}

#[tokio::test]
async fn evaluate_any_lists_every_attempt_on_denial() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::Vendor));

    let decision = fixture
        .service
        .evaluate_any(
            &[
                requirement("payroll.approve.property"),
                requirement("unit.delete.property"),
            ],
            &context,
        )
        .await;

    assert!(!decision.granted);
    let reason = decision.reason.unwrap_or_default();
    assert!(reason.contains("payroll.approve.property"));
    assert!(reason.contains("unit.delete.property"));
}

#[tokio::test]
async fn evaluate_all_requires_every_requirement() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::Staff));

    let decision = fixture
        .service
        .evaluate_all(
            &[
                requirement("vacation.read.own"),
                requirement("payroll.approve.property"),
            ],
            &context,
        )
        .await;

    assert!(!decision.granted);
}

#[tokio::test]
async fn same_department_condition_compares_target_department() {
    let fixture = fixture();
    let user = placed_user(Role::Staff);
    let guarded = requirement("user.read.department").with_conditions(PermissionConditions {
        same_department: true,
        ..PermissionConditions::default()
    });

    let Some(own_department) = user.department_id() else {
        panic!("fixture user has a department");
    };
    let inside = PermissionContext::for_user(user.clone()).with_department(own_department);
    let outside = PermissionContext::for_user(user).with_department(DepartmentId::new());

    assert!(fixture.service.evaluate(&guarded, &inside).await.granted);
    let denied = fixture.service.evaluate(&guarded, &outside).await;
    assert_eq!(
        denied.reason.as_deref(),
        Some("target department does not match the user's department")
    );
}

#[tokio::test]
async fn owner_condition_requires_matching_resource_owner() {
    let fixture = fixture();
    let user = placed_user(Role::Staff);
    let guarded = requirement("vacation.update.own").with_conditions(PermissionConditions {
        is_owner: true,
        ..PermissionConditions::default()
    });

    let mine = PermissionContext::for_user(user.clone()).with_resource_owner(user.id());
    let theirs = PermissionContext::for_user(user).with_resource_owner(UserId::new());

    assert!(fixture.service.evaluate(&guarded, &mine).await.granted);
    assert!(!fixture.service.evaluate(&guarded, &theirs).await.granted);
}

#[tokio::test]
async fn failing_custom_condition_becomes_evaluation_error_denial() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::Staff));
    let guarded = requirement("vacation.read.own").with_conditions(PermissionConditions {
        custom: Some(CustomCondition::new("shift-lookup", |_| {
            Err(AppError::Internal("shift service unavailable".to_owned()))
        })),
        ..PermissionConditions::default()
    });

    let decision = fixture.service.evaluate(&guarded, &context).await;

    assert!(!decision.granted);
    assert!(
        decision
            .reason
            .is_some_and(|reason| reason.starts_with("evaluation error:"))
    );
}

#[tokio::test]
async fn panicking_predicate_is_denied_not_propagated() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::Staff));
    let predicate = CustomCondition::new("broken", |_| panic!("predicate bug"));

    let decision = fixture
        .service
        .evaluate_conditional(&requirement("vacation.read.own"), &predicate, &context)
        .await;

    assert!(!decision.granted);
}

#[tokio::test]
async fn invalid_requirement_input_is_denied() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::PlatformAdmin));

    let decision = fixture
        .service
        .evaluate_input("*.read.platform", &context)
        .await;

    assert!(!decision.granted);
}

#[tokio::test]
async fn require_maps_denial_to_forbidden() {
    let fixture = fixture();
    let context = PermissionContext::for_user(placed_user(Role::Client));

    let result = fixture
        .service
        .require(&requirement("payroll.read.property"), &context)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn scoped_grant_without_tenant_placement_is_denied() {
    let fixture = fixture();
    let unplaced = AuthenticatedUser::new(UserId::new(), Role::PropertyManager);

    let decision = fixture
        .service
        .evaluate(
            &requirement("unit.read.property"),
            &PermissionContext::for_user(unplaced),
        )
        .await;

    assert!(!decision.granted);
    assert!(
        decision
            .reason
            .is_some_and(|reason| reason.contains("no property placement"))
    );
}

#[tokio::test]
async fn unplaced_platform_admin_keeps_scoped_access() {
    let fixture = fixture();
    let admin = AuthenticatedUser::new(UserId::new(), Role::PlatformAdmin);

    let decision = fixture
        .service
        .evaluate(
            &requirement("unit.read.organization"),
            &PermissionContext::for_user(admin),
        )
        .await;

    assert!(decision.granted);
}

#[tokio::test]
async fn only_held_permissions_can_be_delegated() {
    let fixture = fixture();
    let manager = placed_user(Role::PropertyManager);
    let department_admin = placed_user(Role::DepartmentAdmin);

    assert!(fixture.service.can_delegate(&manager, "unit.update.property").await);
    assert!(fixture.service.can_delegate(&manager, "unit.read.department").await);
    assert!(
        !fixture
            .service
            .can_delegate(&manager, "organization.delete.platform")
            .await
    );
    assert!(
        !fixture
            .service
            .can_delegate(&department_admin, "unit.update.property")
            .await
    );
}

#[tokio::test]
async fn wildcard_grants_are_delegated_by_platform_admins_only() {
    let fixture = fixture();

    assert!(
        fixture
            .service
            .can_delegate(&placed_user(Role::PlatformAdmin), "*.read.property")
            .await
    );
    assert!(
        !fixture
            .service
            .can_delegate(&placed_user(Role::OrganizationOwner), "*.read.property")
            .await
    );
    assert!(
        !fixture
            .service
            .can_delegate(&placed_user(Role::PlatformAdmin), "unit.read.galaxy")
            .await
    );
}
