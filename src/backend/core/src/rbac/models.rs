//! RBAC data models: Permission, Role, User, Team, their creation inputs and
//! partial-update patches.
//!
//! Cross-entity links (`Role::permission_ids`, `User::role_id`,
//! `User::team_ids`, `Team::user_ids`) are plain identifiers with no
//! referential integrity. Any of them may name an entity that no longer exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════════

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Strongly-typed permission identifier.
    PermissionId
);
string_id!(
    /// Strongly-typed role identifier.
    RoleId
);
string_id!(
    /// Strongly-typed user identifier.
    UserId
);
string_id!(
    /// Strongly-typed team identifier.
    TeamId
);

// ═══════════════════════════════════════════════════════════════════════════════
// Resource / Action vocabulary
// ═══════════════════════════════════════════════════════════════════════════════

/// Resource kinds the administrative forms offer when creating a permission.
///
/// The store keeps `Permission::resource` as a free string; this enum is the
/// vocabulary callers validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Users,
    Roles,
    Permissions,
    Teams,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Permissions => "permissions",
            Self::Teams => "teams",
        }
    }

    pub fn all() -> [Resource; 4] {
        [Self::Users, Self::Roles, Self::Permissions, Self::Teams]
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown resource: {}", s))
    }
}

/// Actions the administrative forms offer when creating a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Manage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    pub fn all() -> [Action; 5] {
        [Self::View, Self::Create, Self::Edit, Self::Delete, Self::Manage]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown action: {}", s))
    }
}

/// The conventional permission name `"<action>_<resource>"`, e.g. `view_users`.
pub fn permission_name(action: Action, resource: Resource) -> String {
    format!("{}_{}", action, resource)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Entity trait
// ═══════════════════════════════════════════════════════════════════════════════

/// An entity stored in one of the store's collections.
pub trait Entity {
    type Id: Clone + PartialEq + fmt::Display;

    /// Collection label used in logs and metrics.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}

/// A partial update: only the fields it carries are written.
pub trait Patch<E> {
    fn apply(self, target: &mut E);

    /// True when the patch carries no fields.
    fn is_empty(&self) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Permission
// ═══════════════════════════════════════════════════════════════════════════════

/// A named capability tied to a (resource, action) pair.
///
/// `name` is conventionally `"<action>_<resource>"` and is what
/// [`AuthStore::has_permission`](super::AuthStore::has_permission) matches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub description: String,
    pub resource: String,
    pub action: String,
}

impl Entity for Permission {
    type Id = PermissionId;
    const KIND: &'static str = "permission";

    fn id(&self) -> &PermissionId {
        &self.id
    }
}

/// Input for creating a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermission {
    pub name: String,
    pub description: String,
    pub resource: String,
    pub action: String,
}

impl NewPermission {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Build a permission named by convention from a resource/action pair.
    pub fn conventional(action: Action, resource: Resource, description: impl Into<String>) -> Self {
        Self::new(
            permission_name(action, resource),
            description,
            resource.as_str(),
            action.as_str(),
        )
    }

    pub(crate) fn into_permission(self, id: PermissionId) -> Permission {
        Permission {
            id,
            name: self.name,
            description: self.description,
            resource: self.resource,
            action: self.action,
        }
    }
}

/// Partial update for a permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl PermissionPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

impl Patch<Permission> for PermissionPatch {
    fn apply(self, target: &mut Permission) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
        if let Some(resource) = self.resource {
            target.resource = resource;
        }
        if let Some(action) = self.action {
            target.action = action;
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.resource.is_none()
            && self.action.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Role
// ═══════════════════════════════════════════════════════════════════════════════

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    /// Weak references; may contain ids of deleted permissions, or repeats.
    pub permission_ids: Vec<PermissionId>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Check whether the role lists the given permission id.
    pub fn grants(&self, permission_id: &PermissionId) -> bool {
        self.permission_ids.contains(permission_id)
    }
}

impl Entity for Role {
    type Id = RoleId;
    const KIND: &'static str = "role";

    fn id(&self) -> &RoleId {
        &self.id
    }
}

/// Input for creating a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

impl NewRole {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permission_ids: Vec::new(),
        }
    }

    pub fn with_permissions<I, P>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionId>,
    {
        self.permission_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn into_role(self, id: RoleId, created_at: DateTime<Utc>) -> Role {
        Role {
            id,
            name: self.name,
            description: self.description,
            permission_ids: self.permission_ids,
            created_at,
        }
    }
}

/// Partial update for a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_ids: Option<Vec<PermissionId>>,
}

impl RolePatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn permission_ids<I, P>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionId>,
    {
        self.permission_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

impl Patch<Role> for RolePatch {
    fn apply(self, target: &mut Role) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
        if let Some(permission_ids) = self.permission_ids {
            target.permission_ids = permission_ids;
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.permission_ids.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// User
// ═══════════════════════════════════════════════════════════════════════════════

/// An account holding exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role_id: RoleId,
    pub team_ids: Vec<TeamId>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role_id: RoleId,
    #[serde(default)]
    pub team_ids: Vec<TeamId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewUser {
    /// An active user with no teams.
    pub fn new(email: impl Into<String>, name: impl Into<String>, role_id: impl Into<RoleId>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            role_id: role_id.into(),
            team_ids: Vec::new(),
            is_active: true,
        }
    }

    pub fn with_teams<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TeamId>,
    {
        self.team_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub(crate) fn into_user(self, id: UserId, created_at: DateTime<Utc>) -> User {
        User {
            id,
            email: self.email,
            name: self.name,
            role_id: self.role_id,
            team_ids: self.team_ids,
            created_at,
            is_active: self.is_active,
        }
    }
}

/// Partial update for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_ids: Option<Vec<TeamId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserPatch {
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn role_id(mut self, role_id: impl Into<RoleId>) -> Self {
        self.role_id = Some(role_id.into());
        self
    }

    pub fn team_ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TeamId>,
    {
        self.team_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }
}

impl Patch<User> for UserPatch {
    fn apply(self, target: &mut User) {
        if let Some(email) = self.email {
            target.email = email;
        }
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(role_id) = self.role_id {
            target.role_id = role_id;
        }
        if let Some(team_ids) = self.team_ids {
            target.team_ids = team_ids;
        }
        if let Some(is_active) = self.is_active {
            target.is_active = is_active;
        }
    }

    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.role_id.is_none()
            && self.team_ids.is_none()
            && self.is_active.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Team
// ═══════════════════════════════════════════════════════════════════════════════

/// A named grouping of users. Teams have no bearing on authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub description: String,
    /// Weak references; deleting a user leaves its id here.
    pub user_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Team {
    type Id = TeamId;
    const KIND: &'static str = "team";

    fn id(&self) -> &TeamId {
        &self.id
    }
}

/// Input for creating a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub user_ids: Vec<UserId>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            user_ids: Vec::new(),
        }
    }

    pub fn with_members<I, U>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        self.user_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn into_team(self, id: TeamId, created_at: DateTime<Utc>) -> Team {
        Team {
            id,
            name: self.name,
            description: self.description,
            user_ids: self.user_ids,
            created_at,
        }
    }
}

/// Partial update for a team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<UserId>>,
}

impl TeamPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn user_ids<I, U>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        self.user_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

impl Patch<Team> for TeamPatch {
    fn apply(self, target: &mut Team) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
        if let Some(user_ids) = self.user_ids {
            target.user_ids = user_ids;
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.user_ids.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
