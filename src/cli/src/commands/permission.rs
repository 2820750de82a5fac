//! Permission management commands.
//!
//! Creating, editing and deleting permissions all require `manage_permissions`.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use warden_core::rbac::views::{permissions_by_resource, roles_with_permission};
use warden_core::rbac::{
    AuthStore, NewPermission, Patch, Permission, PermissionId, PermissionPatch,
};
use warden_core::validation::Validate;
use warden_core::WardenError;

use super::{not_found, report};
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum PermissionCommands {
    /// List permissions
    List {
        /// Group the listing by resource
        #[arg(short, long)]
        grouped: bool,
    },

    /// Show a permission and the roles that grant it
    Show {
        /// Permission ID
        id: String,
    },

    /// Create a permission
    Add {
        /// users, roles, permissions or teams
        #[arg(long)]
        resource: String,

        /// view, create, edit, delete or manage
        #[arg(long)]
        action: String,

        #[arg(long)]
        description: String,

        /// Defaults to `<action>_<resource>`
        #[arg(long)]
        name: Option<String>,
    },

    /// Update fields of a permission
    Update {
        /// Permission ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        resource: Option<String>,

        #[arg(long)]
        action: Option<String>,
    },

    /// Delete a permission
    Delete {
        /// Permission ID
        id: String,
    },
}

#[derive(Serialize, Tabled)]
struct PermissionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Roles")]
    roles: usize,
}

fn row(store: &AuthStore, permission: &Permission) -> PermissionRow {
    PermissionRow {
        id: permission.id.to_string(),
        name: permission.name.clone(),
        resource: permission.resource.clone(),
        action: permission.action.clone(),
        description: permission.description.clone(),
        roles: roles_with_permission(store, &permission.id).len(),
    }
}

pub fn execute(cmd: PermissionCommands, ctx: &mut Context) -> Result<()> {
    let format = ctx.format;
    match cmd {
        PermissionCommands::List { grouped } => {
            ctx.require("view_permissions")?;
            let store = ctx.store();
            let groups = permissions_by_resource(store.permissions());

            match (format, grouped) {
                (OutputFormat::Table, true) => {
                    for (resource, members) in &groups {
                        output::print_header(resource);
                        let rows: Vec<_> = members.iter().map(|p| row(store, p)).collect();
                        output::print_list(&rows, format)?;
                    }
                }
                (OutputFormat::Table, false) => {
                    let rows: Vec<_> = store.permissions().iter().map(|p| row(store, p)).collect();
                    output::print_list(&rows, format)?;
                }
                (_, true) => {
                    let map: Vec<_> = groups
                        .iter()
                        .map(|(resource, members)| {
                            serde_json::json!({ "resource": resource, "permissions": members })
                        })
                        .collect();
                    output::print_item(&map, format)?;
                }
                (_, false) => output::print_item(store.permissions(), format)?,
            }
        }

        PermissionCommands::Show { id } => {
            ctx.require("view_permissions")?;
            let store = ctx.store();
            let id = PermissionId::new(id);
            let permission = store
                .permission(&id)
                .ok_or_else(|| not_found("permission", id.as_str()))?;
            let roles = roles_with_permission(store, &id);

            if format != OutputFormat::Table {
                return output::print_item(
                    &serde_json::json!({ "permission": permission, "roles": roles }),
                    format,
                );
            }

            output::print_header(&permission.name);
            output::print_detail("ID", permission.id.as_str());
            output::print_detail("Resource", &permission.resource);
            output::print_detail("Action", &permission.action);
            output::print_detail("Description", &permission.description);
            let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
            output::print_detail("Roles", &names.join(", "));
        }

        PermissionCommands::Add {
            resource,
            action,
            description,
            name,
        } => {
            ctx.require("manage_permissions")?;
            let name = name.unwrap_or_else(|| format!("{}_{}", action, resource));
            let input = NewPermission::new(name, description, resource, action)
                .validated()
                .map_err(WardenError::from)?;

            if ctx.store().permission_by_name(&input.name).is_some() {
                output::print_warning(&format!("A permission named {} already exists", input.name));
            }

            let id = ctx.mutate(|s| s.add_permission(input))?;
            report(format, "Created permission", id.as_str())?;
        }

        PermissionCommands::Update {
            id,
            name,
            description,
            resource,
            action,
        } => {
            ctx.require("manage_permissions")?;
            let patch = PermissionPatch {
                name,
                description,
                resource,
                action,
            };
            if patch.is_empty() {
                output::print_info("Nothing to update.");
                return Ok(());
            }
            let patch = patch.validated().map_err(WardenError::from)?;

            let id = PermissionId::new(id);
            if !ctx.mutate(|s| s.update_permission(&id, patch))? {
                return Err(not_found("permission", id.as_str()));
            }
            report(format, "Updated permission", id.as_str())?;
        }

        PermissionCommands::Delete { id } => {
            ctx.require("manage_permissions")?;
            let id = PermissionId::new(id);
            let granted_by = roles_with_permission(ctx.store(), &id).len();
            if granted_by > 0 {
                output::print_warning(&format!(
                    "{} role(s) still list permission {}",
                    granted_by, id
                ));
            }
            if !ctx.mutate(|s| s.delete_permission(&id))? {
                return Err(not_found("permission", id.as_str()));
            }
            report(format, "Deleted permission", id.as_str())?;
        }
    }

    Ok(())
}
