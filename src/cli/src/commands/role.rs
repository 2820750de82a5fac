//! Role management commands.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use warden_core::rbac::views::users_with_role;
use warden_core::rbac::{
    AuthStore, DeletionPolicy, NewRole, Patch, PermissionId, Role, RoleId, RolePatch,
};
use warden_core::validation::Validate;
use warden_core::WardenError;

use super::{not_found, report, short_date};
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum RoleCommands {
    /// List roles with permission and user counts
    List,

    /// Show a role and the permissions it grants
    Show {
        /// Role ID
        id: String,
    },

    /// Create a role
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// Permission ID or name (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },

    /// Update fields of a role
    Update {
        /// Role ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Replace the permission list (comma-separated IDs or names)
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["grant", "revoke"])]
        permissions: Option<Vec<String>>,

        /// Add a permission (repeatable)
        #[arg(long)]
        grant: Vec<String>,

        /// Remove a permission (repeatable)
        #[arg(long)]
        revoke: Vec<String>,
    },

    /// Delete a role. The superadmin role cannot be deleted.
    Delete {
        /// Role ID
        id: String,
    },
}

#[derive(Serialize, Tabled)]
struct RoleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Permissions")]
    permissions: usize,
    #[tabled(rename = "Users")]
    users: usize,
    #[tabled(rename = "Created")]
    created: String,
}

fn row(store: &AuthStore, role: &Role) -> RoleRow {
    RoleRow {
        id: role.id.to_string(),
        name: role.name.clone(),
        description: role.description.clone(),
        permissions: role.permission_ids.len(),
        users: users_with_role(store, &role.id),
        created: short_date(&role.created_at),
    }
}

/// Resolve a permission given by ID or by name. Unknown keys are kept as IDs.
fn resolve_permission(store: &AuthStore, key: &str) -> PermissionId {
    let id = PermissionId::new(key);
    if store.permission(&id).is_some() {
        return id;
    }
    match store.permission_by_name(key) {
        Some(p) => p.id.clone(),
        None => {
            output::print_warning(&format!("Permission {} does not exist", key));
            id
        }
    }
}

fn resolve_all(store: &AuthStore, keys: &[String]) -> Vec<PermissionId> {
    keys.iter().map(|k| resolve_permission(store, k)).collect()
}

pub fn execute(cmd: RoleCommands, ctx: &mut Context) -> Result<()> {
    let format = ctx.format;
    match cmd {
        RoleCommands::List => {
            ctx.require("view_roles")?;
            let store = ctx.store();
            if format == OutputFormat::Table {
                let rows: Vec<_> = store.roles().iter().map(|r| row(store, r)).collect();
                output::print_list(&rows, format)?;
            } else {
                output::print_item(store.roles(), format)?;
            }
        }

        RoleCommands::Show { id } => {
            ctx.require("view_roles")?;
            let store = ctx.store();
            let id = RoleId::new(id);
            let role = store.role(&id).ok_or_else(|| not_found("role", id.as_str()))?;
            let granted: Vec<_> = role
                .permission_ids
                .iter()
                .filter_map(|p| store.permission(p))
                .collect();

            if format != OutputFormat::Table {
                return output::print_item(
                    &serde_json::json!({
                        "role": role,
                        "permissions": granted,
                        "users": users_with_role(store, &id),
                    }),
                    format,
                );
            }

            output::print_header(&role.name);
            output::print_detail("ID", role.id.as_str());
            output::print_detail("Description", &role.description);
            output::print_detail("Users", &users_with_role(store, &id).to_string());
            let names: Vec<_> = granted.iter().map(|p| p.name.as_str()).collect();
            output::print_detail("Permissions", &names.join(", "));
        }

        RoleCommands::Add {
            name,
            description,
            permissions,
        } => {
            ctx.require("create_roles")?;
            let ids = resolve_all(ctx.store(), &permissions);
            let input = NewRole::new(name, description)
                .with_permissions(ids)
                .validated()
                .map_err(WardenError::from)?;

            let id = ctx.mutate(|s| s.add_role(input))?;
            report(format, "Created role", id.as_str())?;
        }

        RoleCommands::Update {
            id,
            name,
            description,
            permissions,
            grant,
            revoke,
        } => {
            ctx.require("edit_roles")?;
            let id = RoleId::new(id);
            let current = ctx
                .store()
                .role(&id)
                .ok_or_else(|| not_found("role", id.as_str()))?;

            let permission_ids = match permissions {
                Some(keys) => Some(resolve_all(ctx.store(), &keys)),
                None if !grant.is_empty() || !revoke.is_empty() => {
                    let revoked = resolve_all(ctx.store(), &revoke);
                    let mut ids: Vec<_> = current
                        .permission_ids
                        .iter()
                        .filter(|p| !revoked.contains(p))
                        .cloned()
                        .collect();
                    for granted in resolve_all(ctx.store(), &grant) {
                        if !ids.contains(&granted) {
                            ids.push(granted);
                        }
                    }
                    Some(ids)
                }
                None => None,
            };

            let patch = RolePatch {
                name,
                description,
                permission_ids,
            };
            if patch.is_empty() {
                output::print_info("Nothing to update.");
                return Ok(());
            }
            let patch = patch.validated().map_err(WardenError::from)?;

            ctx.mutate(|s| s.update_role(&id, patch))?;
            report(format, "Updated role", id.as_str())?;
        }

        RoleCommands::Delete { id } => {
            ctx.require("delete_roles")?;
            let id = RoleId::new(id);
            DeletionPolicy::default().ensure_role_deletable(&id)?;

            let assigned = users_with_role(ctx.store(), &id);
            if assigned > 0 {
                output::print_warning(&format!(
                    "{} user(s) still reference role {} and will resolve no permissions",
                    assigned, id
                ));
            }
            if !ctx.mutate(|s| s.delete_role(&id))? {
                return Err(not_found("role", id.as_str()));
            }
            report(format, "Deleted role", id.as_str())?;
        }
    }

    Ok(())
}
