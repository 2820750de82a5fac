//! The authorization store.
//!
//! `AuthStore` owns the four collections and the current session. It answers
//! "may user U perform action A?" by resolving User → Role → Permissions.
//!
//! Mutations never fail. Updates and deletes on unknown ids are silent no-ops,
//! deletes never cascade, and resolution skips any id that no longer resolves.

use chrono::Utc;
use metrics::counter;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::collection::Collection;
use super::credentials::{CredentialVerifier, StaticCredentials};
use super::models::{
    Entity, NewPermission, NewRole, NewTeam, NewUser, Permission, PermissionId, PermissionPatch,
    Role, RoleId, RolePatch, Team, TeamId, TeamPatch, User, UserId, UserPatch,
};
use super::seed::SeedData;
use super::session::Session;
use crate::telemetry::metrics::{
    LOGIN_ATTEMPTS_TOTAL, PERMISSION_CHECKS_TOTAL, STORE_MUTATIONS_TOTAL,
};

/// The in-memory authorization store.
///
/// Created once by the application's composition root and passed by
/// reference to whatever needs it.
#[derive(Debug, Clone)]
pub struct AuthStore {
    permissions: Collection<Permission>,
    roles: Collection<Role>,
    users: Collection<User>,
    teams: Collection<Team>,
    session: Session,
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthStore {
    /// Create an empty store using the stand-in credential check.
    pub fn new() -> Self {
        Self {
            permissions: Collection::new(),
            roles: Collection::new(),
            users: Collection::new(),
            teams: Collection::new(),
            session: Session::anonymous(),
            verifier: Arc::new(StaticCredentials::default()),
        }
    }

    /// Create a store populated with the standard seed catalogue.
    pub fn seeded() -> Self {
        Self::from_seed(SeedData::standard())
    }

    /// Create a store from seed data. The session starts signed out.
    pub fn from_seed(seed: SeedData) -> Self {
        Self::from_parts(seed.permissions, seed.roles, seed.users, seed.teams)
    }

    /// Create a store from explicit collections. The session starts signed out.
    pub fn from_parts(
        permissions: Vec<Permission>,
        roles: Vec<Role>,
        users: Vec<User>,
        teams: Vec<Team>,
    ) -> Self {
        Self {
            permissions: permissions.into(),
            roles: roles.into(),
            users: users.into(),
            teams: teams.into(),
            ..Self::new()
        }
    }

    /// Replace the credential check used by [`login`](Self::login).
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_slice()
    }

    pub fn roles(&self) -> &[Role] {
        self.roles.as_slice()
    }

    pub fn users(&self) -> &[User] {
        self.users.as_slice()
    }

    pub fn teams(&self) -> &[Team] {
        self.teams.as_slice()
    }

    pub fn permission(&self, id: &PermissionId) -> Option<&Permission> {
        self.permissions.get(id)
    }

    pub fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.get(id)
    }

    /// First permission with the given name.
    pub fn permission_by_name(&self, name: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.name == name)
    }

    /// First user with the given email.
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission management
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a permission and return its freshly minted id.
    pub fn add_permission(&mut self, data: NewPermission) -> PermissionId {
        let id = self.permissions.fresh_id(PermissionId::generate);
        debug!(permission_id = %id, name = %data.name, "Adding permission");
        self.permissions.push(data.into_permission(id.clone()));
        record_mutation(Permission::KIND, "add");
        id
    }

    /// Apply a partial update. Returns `false` (and does nothing) if absent.
    pub fn update_permission(&mut self, id: &PermissionId, patch: PermissionPatch) -> bool {
        let found = self.permissions.update(id, patch);
        log_outcome(Permission::KIND, "update", id, found);
        found
    }

    /// Remove a permission. Roles that list its id keep listing it.
    pub fn delete_permission(&mut self, id: &PermissionId) -> bool {
        let removed = self.permissions.remove(id);
        log_outcome(Permission::KIND, "delete", id, removed);
        removed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a role and return its freshly minted id.
    pub fn add_role(&mut self, data: NewRole) -> RoleId {
        let id = self.roles.fresh_id(RoleId::generate);
        debug!(role_id = %id, name = %data.name, "Adding role");
        self.roles.push(data.into_role(id.clone(), Utc::now()));
        record_mutation(Role::KIND, "add");
        id
    }

    pub fn update_role(&mut self, id: &RoleId, patch: RolePatch) -> bool {
        let found = self.roles.update(id, patch);
        log_outcome(Role::KIND, "update", id, found);
        found
    }

    /// Remove a role. Users holding it keep their `role_id` and resolve to no
    /// permissions. The store permits deleting any role, `superadmin`
    /// included; see [`DeletionPolicy`](super::policy::DeletionPolicy).
    pub fn delete_role(&mut self, id: &RoleId) -> bool {
        let removed = self.roles.remove(id);
        log_outcome(Role::KIND, "delete", id, removed);
        removed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User management
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a user and return its freshly minted id.
    pub fn add_user(&mut self, data: NewUser) -> UserId {
        let id = self.users.fresh_id(UserId::generate);
        debug!(user_id = %id, role_id = %data.role_id, "Adding user");
        self.users.push(data.into_user(id.clone(), Utc::now()));
        record_mutation(User::KIND, "add");
        id
    }

    pub fn update_user(&mut self, id: &UserId, patch: UserPatch) -> bool {
        let found = self.users.update(id, patch);
        log_outcome(User::KIND, "update", id, found);
        found
    }

    /// Remove a user. Teams that list its id keep listing it.
    pub fn delete_user(&mut self, id: &UserId) -> bool {
        let removed = self.users.remove(id);
        log_outcome(User::KIND, "delete", id, removed);
        removed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Team management
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a team and return its freshly minted id.
    pub fn add_team(&mut self, data: NewTeam) -> TeamId {
        let id = self.teams.fresh_id(TeamId::generate);
        debug!(team_id = %id, name = %data.name, "Adding team");
        self.teams.push(data.into_team(id.clone(), Utc::now()));
        record_mutation(Team::KIND, "add");
        id
    }

    pub fn update_team(&mut self, id: &TeamId, patch: TeamPatch) -> bool {
        let found = self.teams.update(id, patch);
        log_outcome(Team::KIND, "update", id, found);
        found
    }

    pub fn delete_team(&mut self, id: &TeamId) -> bool {
        let removed = self.teams.remove(id);
        log_outcome(Team::KIND, "delete", id, removed);
        removed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign in. Succeeds iff the credential check accepts the pair and a user
    /// with that email exists; on failure the session is left untouched.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        if !self.verifier.verify(email, password) {
            warn!(email = %email, "Login rejected: credentials not accepted");
            counter!(LOGIN_ATTEMPTS_TOTAL, "outcome" => "rejected").increment(1);
            return false;
        }

        let Some(user) = self.users.iter().find(|u| u.email == email) else {
            warn!(email = %email, "Login rejected: no user with this email");
            counter!(LOGIN_ATTEMPTS_TOTAL, "outcome" => "unknown_user").increment(1);
            return false;
        };

        info!(user_id = %user.id, "User signed in");
        self.session = Session::authenticated(user.id.clone());
        counter!(LOGIN_ATTEMPTS_TOTAL, "outcome" => "accepted").increment(1);
        true
    }

    /// Sign out unconditionally.
    pub fn logout(&mut self) {
        if let Some(user_id) = self.session.current_user_id() {
            info!(user_id = %user_id, "User signed out");
        }
        self.session = Session::anonymous();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The signed-in user, resolved against the live user collection.
    pub fn current_user(&self) -> Option<&User> {
        self.session
            .current_user_id()
            .and_then(|id| self.users.get(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// The user's role, if both the user and the role it names exist.
    pub fn user_role(&self, user_id: &UserId) -> Option<&Role> {
        let user = self.users.get(user_id)?;
        self.roles.get(&user.role_id)
    }

    /// Effective permissions for a user, in permission-collection order.
    ///
    /// An unknown user, or a user whose role does not exist, resolves to an
    /// empty list. Role entries naming deleted permissions are skipped, and
    /// repeated entries do not produce repeated results.
    pub fn user_permissions(&self, user_id: &UserId) -> Vec<&Permission> {
        let Some(role) = self.user_role(user_id) else {
            return Vec::new();
        };

        let granted: HashSet<&PermissionId> = role.permission_ids.iter().collect();
        self.permissions
            .iter()
            .filter(|p| granted.contains(&p.id))
            .collect()
    }

    /// Whether the user's effective permissions include one named `permission`.
    pub fn has_permission(&self, user_id: &UserId, permission: &str) -> bool {
        let allowed = self
            .user_permissions(user_id)
            .iter()
            .any(|p| p.name == permission);

        counter!(
            PERMISSION_CHECKS_TOTAL,
            "outcome" => if allowed { "allow" } else { "deny" },
        )
        .increment(1);
        allowed
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

fn record_mutation(entity: &'static str, op: &'static str) {
    counter!(STORE_MUTATIONS_TOTAL, "entity" => entity, "op" => op).increment(1);
}

fn log_outcome(entity: &'static str, op: &'static str, id: &impl std::fmt::Display, hit: bool) {
    if hit {
        debug!(entity, id = %id, op, "Applied");
        record_mutation(entity, op);
    } else {
        debug!(entity, id = %id, op, "No entity with this id; ignoring");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::credentials::Credential;

    fn uid(id: &str) -> UserId {
        UserId::new(id)
    }

    fn names(perms: &[&Permission]) -> Vec<String> {
        perms.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_superadmin_resolves_everything() {
        let store = AuthStore::seeded();
        let perms = store.user_permissions(&uid("superadmin"));
        assert_eq!(perms.len(), 14);
        assert!(store.has_permission(&uid("superadmin"), "manage_permissions"));
    }

    #[test]
    fn test_unknown_user_has_nothing() {
        let store = AuthStore::seeded();
        assert!(store.user_permissions(&uid("ghost")).is_empty());
        assert!(!store.has_permission(&uid("ghost"), "view_users"));
    }

    #[test]
    fn test_missing_role_has_nothing() {
        let mut store = AuthStore::seeded();
        let id = store.add_user(NewUser::new("n@example.com", "N", "no-such-role"));
        assert!(store.user_permissions(&id).is_empty());
    }

    #[test]
    fn test_order_follows_permission_collection() {
        let mut store = AuthStore::seeded();
        let role = store.add_role(NewRole::new("R", "d").with_permissions(["9", "1", "5", "1"]));
        let user = store.add_user(NewUser::new("r@example.com", "R", role));

        let perms = store.user_permissions(&user);
        assert_eq!(names(&perms), vec!["view_users", "view_roles", "view_teams"]);
    }

    #[test]
    fn test_dangling_permission_is_skipped() {
        let mut store = AuthStore::seeded();
        let role = store.add_role(NewRole::new("X", "d").with_permissions(["1", "9999"]));
        let user = store.add_user(NewUser::new("x@example.com", "X", role));

        let perms = store.user_permissions(&user);
        assert_eq!(perms.len(), 1);
        assert_eq!(perms[0].id.as_str(), "1");
    }

    #[test]
    fn test_delete_permission_leaves_role_reference() {
        let mut store = AuthStore::seeded();
        assert!(store.delete_permission(&PermissionId::new("14")));

        let role = store.role(&RoleId::new("superadmin")).unwrap();
        assert!(role.grants(&PermissionId::new("14")));
        assert!(!store.has_permission(&uid("superadmin"), "manage_permissions"));
        assert_eq!(store.user_permissions(&uid("superadmin")).len(), 13);
    }

    #[test]
    fn test_delete_role_is_permitted_for_superadmin() {
        let mut store = AuthStore::seeded();
        assert!(store.delete_role(&RoleId::new("superadmin")));
        assert!(store.user_permissions(&uid("superadmin")).is_empty());
    }

    #[test]
    fn test_delete_user_leaves_team_reference() {
        let mut store = AuthStore::seeded();
        assert!(store.delete_user(&uid("superadmin")));
        let team = store.team(&TeamId::new("2")).unwrap();
        assert_eq!(team.user_ids, vec![uid("superadmin")]);
    }

    #[test]
    fn test_update_and_delete_unknown_are_noops() {
        let mut store = AuthStore::seeded();
        let before = store.clone();

        assert!(!store.update_user(&uid("ghost"), UserPatch::default().name("x")));
        assert!(!store.update_role(&RoleId::new("ghost"), RolePatch::default().name("x")));
        assert!(!store.delete_team(&TeamId::new("ghost")));
        assert!(!store.delete_permission(&PermissionId::new("ghost")));

        assert_eq!(store.users(), before.users());
        assert_eq!(store.roles(), before.roles());
        assert_eq!(store.teams(), before.teams());
        assert_eq!(store.permissions(), before.permissions());
    }

    #[test]
    fn test_login_success_and_logout() {
        let mut store = AuthStore::seeded();
        assert!(store.login("superadmin@example.com", "test123"));
        assert!(store.is_authenticated());
        assert_eq!(store.current_user().unwrap().id.as_str(), "superadmin");

        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.current_user().is_none());
        assert_eq!(store.session(), &Session::anonymous());
    }

    #[test]
    fn test_failed_login_leaves_session() {
        let mut store = AuthStore::seeded();
        assert!(store.login("superadmin@example.com", "test123"));
        let before = store.session().clone();

        assert!(!store.login("x@x.com", "wrong"));
        assert_eq!(store.session(), &before);
    }

    #[test]
    fn test_login_requires_existing_user() {
        let mut store = AuthStore::seeded();
        store.delete_user(&uid("superadmin"));
        assert!(!store.login("superadmin@example.com", "test123"));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_custom_verifier() {
        let mut store = AuthStore::seeded().with_verifier(Arc::new(StaticCredentials::new(vec![
            Credential::new("ops@example.com", "pw"),
        ])));
        let ops = store.add_user(NewUser::new("ops@example.com", "Ops", "admin"));

        assert!(!store.login("superadmin@example.com", "test123"));
        assert!(store.login("ops@example.com", "pw"));
        assert_eq!(store.current_user().unwrap().id, ops);
    }

    #[test]
    fn test_current_user_follows_deletion() {
        let mut store = AuthStore::seeded();
        store.login("superadmin@example.com", "test123");
        store.delete_user(&uid("superadmin"));

        assert!(store.is_authenticated());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_lookup_helpers() {
        let store = AuthStore::seeded();
        assert_eq!(
            store.permission_by_name("delete_teams").unwrap().id.as_str(),
            "12"
        );
        assert_eq!(
            store.user_by_email("superadmin@example.com").unwrap().id.as_str(),
            "superadmin"
        );
        assert!(store.permission_by_name("launch_rockets").is_none());
    }
}
