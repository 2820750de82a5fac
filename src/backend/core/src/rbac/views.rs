//! Read-only derivations for administrative screens.
//!
//! None of these carry authorization meaning. They group, count, filter and
//! page what the store already holds.

use serde::Serialize;

use super::models::{
    permission_name, Action, Permission, PermissionId, Resource, Role, RoleId, Team, User, UserId,
};
use super::store::AuthStore;

/// Rows per page in administrative listings.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Permissions grouped by `resource`, groups in first-appearance order.
pub fn permissions_by_resource(permissions: &[Permission]) -> Vec<(&str, Vec<&Permission>)> {
    let mut groups: Vec<(&str, Vec<&Permission>)> = Vec::new();
    for permission in permissions {
        match groups.iter_mut().find(|(r, _)| *r == permission.resource) {
            Some((_, members)) => members.push(permission),
            None => groups.push((permission.resource.as_str(), vec![permission])),
        }
    }
    groups
}

/// Roles that list the given permission id.
pub fn roles_with_permission<'a>(store: &'a AuthStore, id: &PermissionId) -> Vec<&'a Role> {
    store.roles().iter().filter(|r| r.grants(id)).collect()
}

/// Number of users assigned the given role.
pub fn users_with_role(store: &AuthStore, role_id: &RoleId) -> usize {
    store.users().iter().filter(|u| &u.role_id == role_id).count()
}

/// Existing users listed on a team, in user-collection order.
pub fn team_members<'a>(store: &'a AuthStore, team: &Team) -> Vec<&'a User> {
    store
        .users()
        .iter()
        .filter(|u| team.user_ids.contains(&u.id))
        .collect()
}

/// Users whose name or email contains `term`, ignoring case.
pub fn search_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let needle = term.to_lowercase();
    users
        .iter()
        .filter(|u| {
            u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
        })
        .collect()
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// 1-based index of the first item shown, 0 when empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item shown, 0 when empty.
    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_index() + self.items.len() - 1
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into a page. Page numbers clamp into `1..=total_pages`.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// What a user may do on one resource's screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Capabilities {
    /// Resolve create/edit/delete/view for `resource`. For permissions, every
    /// mutating action is gated on `manage_permissions`.
    pub fn resolve(store: &AuthStore, user_id: &UserId, resource: Resource) -> Self {
        let held = store.permission_names(user_id);
        let has = |action: Action| held.contains(permission_name(action, resource).as_str());

        match resource {
            Resource::Permissions => {
                let manage = has(Action::Manage);
                Self {
                    can_view: has(Action::View),
                    can_create: manage,
                    can_edit: manage,
                    can_delete: manage,
                }
            }
            _ => Self {
                can_view: has(Action::View),
                can_create: has(Action::Create),
                can_edit: has(Action::Edit),
                can_delete: has(Action::Delete),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::models::{NewPermission, NewTeam, NewUser, TeamId};

    #[test]
    fn test_group_by_resource_keeps_first_appearance_order() {
        let store = AuthStore::seeded();
        let groups = permissions_by_resource(store.permissions());
        let resources: Vec<_> = groups.iter().map(|(r, _)| *r).collect();
        assert_eq!(resources, vec!["users", "roles", "teams", "permissions"]);
        assert_eq!(groups[0].1.len(), 4);
        assert_eq!(groups[3].1.len(), 2);
    }

    #[test]
    fn test_group_appends_to_existing_group() {
        let mut store = AuthStore::seeded();
        store.add_permission(NewPermission::new("export_users", "Export", "users", "manage"));
        let groups = permissions_by_resource(store.permissions());
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].1.len(), 5);
    }

    #[test]
    fn test_roles_with_permission() {
        let store = AuthStore::seeded();
        let ids: Vec<_> = roles_with_permission(&store, &PermissionId::new("1"))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["superadmin", "admin", "user"]);

        let ids: Vec<_> = roles_with_permission(&store, &PermissionId::new("14"))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["superadmin"]);
    }

    #[test]
    fn test_users_with_role() {
        let mut store = AuthStore::seeded();
        store.add_user(NewUser::new("a@example.com", "A", "user"));
        store.add_user(NewUser::new("b@example.com", "B", "user"));
        assert_eq!(users_with_role(&store, &RoleId::new("user")), 2);
        assert_eq!(users_with_role(&store, &RoleId::new("superadmin")), 1);
        assert_eq!(users_with_role(&store, &RoleId::new("admin")), 0);
    }

    #[test]
    fn test_team_members_skip_dangling_ids() {
        let mut store = AuthStore::seeded();
        let team_id = store.add_team(
            NewTeam::new("Ops", "Operations").with_members(["superadmin", "deleted-user"]),
        );
        let team = store.team(&team_id).unwrap().clone();
        let members = team_members(&store, &team);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id.as_str(), "superadmin");

        let dev = store.team(&TeamId::new("1")).unwrap().clone();
        assert!(team_members(&store, &dev).is_empty());
    }

    #[test]
    fn test_search_users_case_insensitive() {
        let mut store = AuthStore::seeded();
        store.add_user(NewUser::new("grace@navy.mil", "Grace Hopper", "user"));

        assert_eq!(search_users(store.users(), "HOPPER").len(), 1);
        assert_eq!(search_users(store.users(), "example.com").len(), 1);
        assert_eq!(search_users(store.users(), "").len(), 2);
        assert!(search_users(store.users(), "nobody").is_empty());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=23).collect();

        let first = paginate(&items, 1, DEFAULT_PAGE_SIZE);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!((first.first_index(), first.last_index()), (1, 10));
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 3, DEFAULT_PAGE_SIZE);
        assert_eq!(last.items, vec![21, 22, 23]);
        assert_eq!((last.first_index(), last.last_index()), (21, 23));
        assert!(!last.has_next());

        let clamped = paginate(&items, 99, DEFAULT_PAGE_SIZE);
        assert_eq!(clamped.page, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, DEFAULT_PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.first_index(), 0);
    }

    #[test]
    fn test_capabilities() {
        let mut store = AuthStore::seeded();
        let admin = store.add_user(NewUser::new("adm@example.com", "Adm", "admin"));

        let users = Capabilities::resolve(&store, &admin, Resource::Users);
        assert!(users.can_view && users.can_create && users.can_edit);
        assert!(!users.can_delete);

        let perms = Capabilities::resolve(&store, &admin, Resource::Permissions);
        assert_eq!(perms, Capabilities::default());

        let root = Capabilities::resolve(&store, &UserId::new("superadmin"), Resource::Permissions);
        assert!(root.can_view && root.can_create && root.can_delete);
    }
}
