//! Policy decisions layered on top of [`AuthStore::has_permission`].
//!
//! The store's predicate is a bare boolean. Callers acting on behalf of a user
//! usually want a reasoned decision, an error to propagate, or a combined
//! check over several permissions; those live here. The deletion policy for
//! protected roles is also here, since the store itself never refuses a delete.

use std::collections::HashSet;
use tracing::{debug, warn};

use super::models::{RoleId, UserId};
use super::seed::SUPERADMIN_ID;
use super::store::AuthStore;
use crate::error::{Result, WardenError};

// ═══════════════════════════════════════════════════════════════════════════════
// Decision
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The action is allowed.
    Allow,
    /// The action is denied, with a reason.
    Deny(String),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Checks
// ═══════════════════════════════════════════════════════════════════════════════

impl AuthStore {
    /// Check a single named permission and explain a denial.
    pub fn check(&self, user_id: &UserId, permission: &str) -> PolicyDecision {
        if self.has_permission(user_id, permission) {
            debug!(user_id = %user_id, permission, "Permission granted");
            return PolicyDecision::Allow;
        }

        let reason = match self.user(user_id) {
            None => format!("User {} does not exist", user_id),
            Some(user) if self.role(&user.role_id).is_none() => format!(
                "User {} has role {} which does not exist",
                user_id, user.role_id
            ),
            Some(_) => format!("User {} does not have permission {}", user_id, permission),
        };
        PolicyDecision::Deny(reason)
    }

    /// Returns `Ok(())` if allowed, a `Forbidden` error if denied.
    pub fn enforce(&self, user_id: &UserId, permission: &str) -> Result<()> {
        match self.check(user_id, permission) {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny(reason) => {
                warn!(user_id = %user_id, permission, "Permission denied");
                Err(WardenError::forbidden(reason).with_context("permission", permission))
            }
        }
    }

    /// Returns `Allow` only if ALL permissions are granted.
    pub fn check_all(&self, user_id: &UserId, permissions: &[&str]) -> PolicyDecision {
        let held = self.permission_names(user_id);
        match permissions.iter().find(|p| !held.contains(**p)) {
            None => PolicyDecision::Allow,
            Some(missing) => PolicyDecision::Deny(format!(
                "User {} does not have permission {}",
                user_id, missing
            )),
        }
    }

    /// Returns `Allow` if ANY permission is granted.
    pub fn check_any(&self, user_id: &UserId, permissions: &[&str]) -> PolicyDecision {
        let held = self.permission_names(user_id);
        if permissions.iter().any(|p| held.contains(*p)) {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Deny(format!(
                "User {} does not have any of the required permissions",
                user_id
            ))
        }
    }

    /// Names of the user's effective permissions.
    pub fn permission_names(&self, user_id: &UserId) -> HashSet<&str> {
        self.user_permissions(user_id)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Deletion policy
// ═══════════════════════════════════════════════════════════════════════════════

/// Roles the administrative surface refuses to delete.
///
/// Only `superadmin` is protected by default. The store still allows deleting
/// it; this policy is applied by the layer that offers the delete action.
#[derive(Debug, Clone)]
pub struct DeletionPolicy {
    protected_roles: Vec<RoleId>,
}

impl DeletionPolicy {
    pub fn new(protected_roles: Vec<RoleId>) -> Self {
        Self { protected_roles }
    }

    pub fn is_protected(&self, role_id: &RoleId) -> bool {
        self.protected_roles.contains(role_id)
    }

    /// `Ok(())` if the role may be deleted, `ProtectedEntity` otherwise.
    pub fn ensure_role_deletable(&self, role_id: &RoleId) -> Result<()> {
        if self.is_protected(role_id) {
            warn!(role_id = %role_id, "Refusing to delete protected role");
            return Err(WardenError::protected("role", role_id.as_str()));
        }
        Ok(())
    }
}

impl Default for DeletionPolicy {
    fn default() -> Self {
        Self::new(vec![RoleId::new(SUPERADMIN_ID)])
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::rbac::models::NewUser;

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    fn store_with_member() -> (AuthStore, UserId) {
        let mut store = AuthStore::seeded();
        let id = store.add_user(NewUser::new("m@example.com", "Member", "user"));
        (store, id)
    }

    #[test]
    fn test_check_allows_and_denies() {
        let (store, member) = store_with_member();
        assert!(store.check(&member, "view_users").is_allowed());
        assert!(store.check(&member, "delete_users").is_denied());
    }

    #[test]
    fn test_deny_reason_mentions_missing_user() {
        let store = AuthStore::seeded();
        match store.check(&user("ghost"), "view_users") {
            PolicyDecision::Deny(reason) => assert!(reason.contains("does not exist")),
            PolicyDecision::Allow => panic!("expected deny"),
        }
    }

    #[test]
    fn test_deny_reason_mentions_missing_role() {
        let mut store = AuthStore::seeded();
        let id = store.add_user(NewUser::new("o@example.com", "Orphan", "gone"));
        match store.check(&id, "view_users") {
            PolicyDecision::Deny(reason) => assert!(reason.contains("role gone")),
            PolicyDecision::Allow => panic!("expected deny"),
        }
    }

    #[test]
    fn test_enforce() {
        let (store, member) = store_with_member();
        assert!(store.enforce(&user("superadmin"), "delete_roles").is_ok());

        let err = store.enforce(&member, "delete_roles").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn test_check_all() {
        let (store, member) = store_with_member();
        assert!(store
            .check_all(&member, &["view_users", "view_roles", "view_teams"])
            .is_allowed());
        assert!(store
            .check_all(&member, &["view_users", "edit_users"])
            .is_denied());
        assert!(store.check_all(&member, &[]).is_allowed());
    }

    #[test]
    fn test_check_any() {
        let (store, member) = store_with_member();
        assert!(store
            .check_any(&member, &["delete_users", "view_users"])
            .is_allowed());
        assert!(store
            .check_any(&member, &["delete_users", "manage_permissions"])
            .is_denied());
    }

    #[test]
    fn test_superadmin_role_is_protected_by_default() {
        let policy = DeletionPolicy::default();
        let err = policy
            .ensure_role_deletable(&RoleId::new("superadmin"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProtectedEntity);
        assert!(policy.ensure_role_deletable(&RoleId::new("admin")).is_ok());
    }
}
