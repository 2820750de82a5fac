//! Integration tests for access guards, policy checks and listing helpers.
//!
//! Each scenario signs a user in through a custom credential list and checks
//! what the administrative screens would allow.

use std::sync::Arc;

use warden_core::error::ErrorCode;
use warden_core::rbac::views::{paginate, permissions_by_resource, search_users, team_members};
use warden_core::rbac::{
    authorize, navigation, Access, AuthStore, Capabilities, Credential, DeletionPolicy, NewUser,
    PolicyDecision, Resource, RoleId, StaticCredentials, TeamPatch, UserId, SUPERADMIN_ID,
};
use warden_core::validation::Validate;

// ============================================================================
// Test Utilities
// ============================================================================

/// Seeded store where `admin@example.com` and `viewer@example.com` can sign in.
fn store_with_staff() -> (AuthStore, UserId, UserId) {
    let verifier = StaticCredentials::new(vec![
        Credential::new("superadmin@example.com", "test123"),
        Credential::new("admin@example.com", "admin-pass"),
        Credential::new("viewer@example.com", "viewer-pass"),
    ]);
    let mut store = AuthStore::seeded().with_verifier(Arc::new(verifier));
    let admin = store.add_user(NewUser::new("admin@example.com", "Alice Admin", "admin"));
    let viewer = store.add_user(NewUser::new("viewer@example.com", "Victor Viewer", "user"));
    (store, admin, viewer)
}

fn section_names(store: &AuthStore) -> Vec<&'static str> {
    navigation(store).iter().map(|s| s.name).collect()
}

// ============================================================================
// Guard
// ============================================================================

#[test]
fn test_guard_requires_login() {
    let (store, _, _) = store_with_staff();
    assert_eq!(authorize(&store, None), Access::LoginRequired);

    let err = authorize(&store, Some("view_users")).into_result().unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[test]
fn test_guard_without_permission_only_needs_login() {
    let (mut store, _, viewer) = store_with_staff();
    assert!(store.login("viewer@example.com", "viewer-pass"));

    match authorize(&store, None) {
        Access::Granted(user) => assert_eq!(user.id, viewer),
        other => panic!("expected Granted, got {:?}", other),
    }
}

#[test]
fn test_viewer_is_forbidden_from_permissions_screen() {
    let (mut store, _, _) = store_with_staff();
    store.login("viewer@example.com", "viewer-pass");

    assert_eq!(
        authorize(&store, Some("view_permissions")),
        Access::Forbidden {
            permission: "view_permissions".to_string()
        }
    );
    let err = authorize(&store, Some("view_permissions"))
        .into_result()
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.code().exit_code(), 77);
}

#[test]
fn test_navigation_follows_role() {
    let (mut store, _, _) = store_with_staff();
    assert!(section_names(&store).is_empty());

    store.login("viewer@example.com", "viewer-pass");
    assert_eq!(section_names(&store), vec!["Users", "Roles", "Teams"]);

    store.login("admin@example.com", "admin-pass");
    assert_eq!(section_names(&store), vec!["Users", "Roles", "Teams"]);

    store.login("superadmin@example.com", "test123");
    assert_eq!(section_names(&store), vec!["Users", "Roles", "Permissions", "Teams"]);

    store.logout();
    assert!(section_names(&store).is_empty());
}

#[test]
fn test_guard_after_current_user_deleted() {
    let (mut store, admin, _) = store_with_staff();
    store.login("admin@example.com", "admin-pass");
    store.delete_user(&admin);

    assert_eq!(authorize(&store, None), Access::LoginRequired);
}

// ============================================================================
// Capabilities
// ============================================================================

#[test]
fn test_admin_capabilities() {
    let (store, admin, _) = store_with_staff();

    let users = Capabilities::resolve(&store, &admin, Resource::Users);
    assert!(users.can_view && users.can_create && users.can_edit);
    assert!(!users.can_delete);

    let permissions = Capabilities::resolve(&store, &admin, Resource::Permissions);
    assert_eq!(permissions, Capabilities::default());
}

#[test]
fn test_permission_management_is_all_or_nothing() {
    let (store, _, _) = store_with_staff();
    let superadmin = UserId::new(SUPERADMIN_ID);

    let caps = Capabilities::resolve(&store, &superadmin, Resource::Permissions);
    assert!(caps.can_view && caps.can_create && caps.can_edit && caps.can_delete);
}

// ============================================================================
// Policy
// ============================================================================

#[test]
fn test_check_explains_denials() {
    let (mut store, _, viewer) = store_with_staff();

    assert_eq!(store.check(&viewer, "view_users"), PolicyDecision::Allow);
    assert!(store.check(&viewer, "delete_users").is_denied());
    assert!(matches!(
        store.check(&UserId::new("ghost"), "view_users"),
        PolicyDecision::Deny(reason) if reason.contains("does not exist")
    ));

    let orphan = store.add_user(NewUser::new("orphan@example.com", "Orphan", "gone"));
    assert!(matches!(
        store.check(&orphan, "view_users"),
        PolicyDecision::Deny(reason) if reason.contains("gone")
    ));
}

#[test]
fn test_check_all_and_any() {
    let (store, admin, _) = store_with_staff();

    assert!(store.check_all(&admin, &["view_users", "edit_users"]).is_allowed());
    assert!(store.check_all(&admin, &["view_users", "delete_users"]).is_denied());
    assert!(store.check_any(&admin, &["delete_users", "edit_users"]).is_allowed());
    assert!(store.check_any(&admin, &["delete_users", "manage_permissions"]).is_denied());
}

#[test]
fn test_enforce_returns_forbidden() {
    let (store, admin, _) = store_with_staff();

    assert!(store.enforce(&admin, "edit_roles").is_ok());
    let err = store.enforce(&admin, "delete_roles").unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[test]
fn test_superadmin_role_is_protected_by_policy_only() {
    let (mut store, _, _) = store_with_staff();
    let policy = DeletionPolicy::default();
    let superadmin = RoleId::new(SUPERADMIN_ID);

    let err = policy.ensure_role_deletable(&superadmin).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProtectedEntity);
    assert!(policy.ensure_role_deletable(&RoleId::new("admin")).is_ok());

    // The store itself still allows it.
    assert!(store.delete_role(&superadmin));
}

// ============================================================================
// Listing helpers
// ============================================================================

#[test]
fn test_permissions_grouped_by_resource() {
    let store = AuthStore::seeded();
    let groups = permissions_by_resource(store.permissions());

    let resources: Vec<_> = groups.iter().map(|(r, _)| *r).collect();
    assert_eq!(resources, vec!["users", "roles", "teams", "permissions"]);
    assert!(groups.iter().take(3).all(|(_, members)| members.len() == 4));
    assert_eq!(groups[3].1.len(), 2);
}

#[test]
fn test_team_members_skip_deleted_users() {
    let (mut store, admin, viewer) = store_with_staff();
    let team = "1".into();
    store.update_team(&team, TeamPatch::default().user_ids([admin.clone(), viewer.clone()]));
    store.delete_user(&viewer);

    let team = store.team(&team).unwrap();
    let members: Vec<_> = team_members(&store, team).iter().map(|u| u.id.clone()).collect();
    assert_eq!(members, vec![admin]);
    assert_eq!(team.user_ids.len(), 2);
}

#[test]
fn test_search_then_paginate_users() {
    let (mut store, _, _) = store_with_staff();
    for i in 0..12 {
        store.add_user(NewUser::new(format!("bulk{}@example.com", i), format!("Bulk {}", i), "user"));
    }

    let matched = search_users(store.users(), "BULK");
    assert_eq!(matched.len(), 12);

    let second = paginate(&matched, 2, 10);
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.total_pages, 2);
    assert!(second.has_previous());
    assert!(!second.has_next());
}

// ============================================================================
// Validation before writes
// ============================================================================

#[test]
fn test_invalid_input_is_rejected_before_reaching_store() {
    let (mut store, _, _) = store_with_staff();
    let before = store.users().len();

    let input = NewUser::new("not-an-email", "", "user");
    let errors = input.validate().unwrap_err();
    assert!(errors.has_errors("email"));
    assert!(errors.has_errors("name"));

    // The store does not validate; callers are expected to.
    store.add_user(input);
    assert_eq!(store.users().len(), before + 1);
}
