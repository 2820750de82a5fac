//! First-run seed catalogue.
//!
//! Warden ships with fourteen permissions, three roles, one user and two teams:
//!
//! | Role         | Permissions                                              |
//! |--------------|----------------------------------------------------------|
//! | Super Admin  | Every permission present at seed time                    |
//! | Admin        | view/create/edit on users, roles and teams               |
//! | User         | view_users, view_roles, view_teams                       |
//!
//! The seed is also the acceptance baseline the tests run against.

use chrono::{DateTime, Utc};

use super::credentials::SUPERADMIN_EMAIL;
use super::models::{
    Action, NewPermission, NewRole, NewTeam, NewUser, Permission, PermissionId, Resource, Role,
    RoleId, Team, TeamId, User, UserId,
};

/// Id shared by the seeded super administrator role and user.
pub const SUPERADMIN_ID: &str = "superadmin";

/// Predefined role templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedRole {
    SuperAdmin,
    Admin,
    User,
}

impl SeedRole {
    /// Get the role identifier string.
    pub fn id(&self) -> &'static str {
        match self {
            Self::SuperAdmin => SUPERADMIN_ID,
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Get the human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }

    /// Get the description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Full system access",
            Self::Admin => "Administrative access",
            Self::User => "Basic user access",
        }
    }

    /// Permission ids granted by this role, given the permissions that exist
    /// at seed time.
    pub fn permission_ids(&self, permissions: &[Permission]) -> Vec<PermissionId> {
        match self {
            Self::SuperAdmin => permissions.iter().map(|p| p.id.clone()).collect(),
            Self::Admin => ["1", "2", "3", "5", "6", "7", "9", "10", "11"]
                .into_iter()
                .map(PermissionId::from)
                .collect(),
            Self::User => ["1", "5", "9"].into_iter().map(PermissionId::from).collect(),
        }
    }

    /// Build the `Role` for this template.
    pub fn to_role(&self, permissions: &[Permission], created_at: DateTime<Utc>) -> Role {
        NewRole::new(self.name(), self.description())
            .with_permissions(self.permission_ids(permissions))
            .into_role(RoleId::new(self.id()), created_at)
    }

    /// Return all seed roles.
    pub fn all() -> Vec<SeedRole> {
        vec![Self::SuperAdmin, Self::Admin, Self::User]
    }
}

/// The fourteen seed permissions, ids `"1"` through `"14"`.
pub fn seed_permissions() -> Vec<Permission> {
    let crud = [Action::View, Action::Create, Action::Edit, Action::Delete];
    let mut specs: Vec<(Action, Resource)> = Vec::new();
    for resource in [Resource::Users, Resource::Roles, Resource::Teams] {
        specs.extend(crud.iter().map(|action| (*action, resource)));
    }
    specs.push((Action::View, Resource::Permissions));
    specs.push((Action::Manage, Resource::Permissions));

    specs
        .into_iter()
        .enumerate()
        .map(|(i, (action, resource))| {
            let description = format!("{} {}", capitalize(action.as_str()), resource);
            NewPermission::conventional(action, resource, description)
                .into_permission(PermissionId::new((i + 1).to_string()))
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whole-state seed: the four collections the store starts from.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub permissions: Vec<Permission>,
    pub roles: Vec<Role>,
    pub users: Vec<User>,
    pub teams: Vec<Team>,
}

impl SeedData {
    /// The standard catalogue, timestamped `created_at`.
    pub fn standard_at(created_at: DateTime<Utc>) -> Self {
        let permissions = seed_permissions();
        let roles = SeedRole::all()
            .into_iter()
            .map(|r| r.to_role(&permissions, created_at))
            .collect();

        let users = vec![NewUser::new(SUPERADMIN_EMAIL, "Super Administrator", SUPERADMIN_ID)
            .into_user(UserId::new(SUPERADMIN_ID), created_at)];

        let teams = vec![
            NewTeam::new("Development Team", "Software development team")
                .into_team(TeamId::new("1"), created_at),
            NewTeam::new("Management Team", "Management and leadership team")
                .with_members([SUPERADMIN_ID])
                .into_team(TeamId::new("2"), created_at),
        ];

        Self {
            permissions,
            roles,
            users,
            teams,
        }
    }

    /// The standard catalogue, timestamped now.
    pub fn standard() -> Self {
        Self::standard_at(Utc::now())
    }
}

impl Default for SeedData {
    fn default() -> Self {
        Self::standard()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
