//! Whole-state snapshot of the four collections.

use serde::{Deserialize, Serialize};

use crate::rbac::models::{Permission, Role, Team, User};
use crate::rbac::seed::SeedData;
use crate::rbac::store::AuthStore;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Serializable export of the store. The session is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Snapshot {
    /// Copy the store's collections, in collection order.
    pub fn capture(store: &AuthStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            permissions: store.permissions().to_vec(),
            roles: store.roles().to_vec(),
            users: store.users().to_vec(),
            teams: store.teams().to_vec(),
        }
    }

    /// Rebuild a signed-out store from this snapshot.
    pub fn restore(self) -> AuthStore {
        AuthStore::from_parts(self.permissions, self.roles, self.users, self.teams)
    }

    pub fn is_supported(&self) -> bool {
        self.version <= SNAPSHOT_VERSION
    }
}

impl From<SeedData> for Snapshot {
    fn from(seed: SeedData) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            permissions: seed.permissions,
            roles: seed.roles,
            users: seed.users,
            teams: seed.teams,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::models::{NewUser, UserId};

    #[test]
    fn test_capture_and_restore_preserve_order() {
        let mut store = AuthStore::seeded();
        store.add_user(NewUser::new("b@example.com", "B", "user"));
        store.add_user(NewUser::new("a@example.com", "A", "admin"));

        let snapshot = Snapshot::capture(&store);
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);

        let restored = snapshot.clone().restore();
        assert_eq!(restored.users(), store.users());
        assert_eq!(restored.permissions(), store.permissions());
        assert_eq!(Snapshot::capture(&restored), snapshot);
    }

    #[test]
    fn test_restore_is_signed_out() {
        let mut store = AuthStore::seeded();
        assert!(store.login("superadmin@example.com", "test123"));

        let restored = Snapshot::capture(&store).restore();
        assert!(!restored.is_authenticated());
        assert!(restored.current_user().is_none());
    }

    #[test]
    fn test_camel_case_layout() {
        let snapshot = Snapshot::from(SeedData::standard());
        let json = serde_json::to_value(&snapshot).unwrap();

        let role = &json["roles"][0];
        assert!(role.get("permissionIds").is_some());
        assert!(role.get("createdAt").is_some());

        let user = &json["users"][0];
        assert_eq!(user["roleId"], "superadmin");
        assert_eq!(user["isActive"], true);
        assert!(user.get("teamIds").is_some());
        assert!(json.get("session").is_none());
    }

    #[test]
    fn test_missing_collections_default_empty() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"users": []}"#).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(snapshot.permissions.is_empty());
        assert!(snapshot.restore().user(&UserId::new("superadmin")).is_none());
    }

    #[test]
    fn test_future_version_unsupported() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"version": 99}"#).unwrap();
        assert!(!snapshot.is_supported());
    }
}
