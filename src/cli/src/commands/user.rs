//! User management commands.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use warden_core::rbac::views::{paginate, search_users, DEFAULT_PAGE_SIZE};
use warden_core::rbac::{AuthStore, NewUser, Patch, User, UserId, UserPatch};
use warden_core::validation::Validate;
use warden_core::WardenError;

use super::{not_found, report, short_date};
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List {
        /// Case-insensitive filter on name or email
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Rows per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },

    /// Show a user with their role and effective permissions
    Show {
        /// User ID
        id: String,
    },

    /// Create a user
    Add {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        /// Role ID
        #[arg(long)]
        role: String,

        /// Team ID (repeatable)
        #[arg(long = "team")]
        teams: Vec<String>,

        /// Create the user as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update fields of a user
    Update {
        /// User ID
        id: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        name: Option<String>,

        /// Role ID
        #[arg(long)]
        role: Option<String>,

        /// Replace team memberships (comma-separated team IDs)
        #[arg(long, value_delimiter = ',')]
        teams: Option<Vec<String>>,

        /// Set the active flag
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: String,
    },
}

#[derive(Serialize, Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Teams")]
    teams: usize,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn role_label(store: &AuthStore, user: &User) -> String {
    store
        .role(&user.role_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| format!("{} (missing)", user.role_id))
}

fn row(store: &AuthStore, user: &User) -> UserRow {
    UserRow {
        id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: role_label(store, user),
        teams: user.team_ids.len(),
        active: output::yes_no(user.is_active),
        created: short_date(&user.created_at),
    }
}

pub fn execute(cmd: UserCommands, ctx: &mut Context) -> Result<()> {
    let format = ctx.format;
    match cmd {
        UserCommands::List {
            search,
            page,
            per_page,
        } => {
            ctx.require("view_users")?;
            let store = ctx.store();
            let matched = search_users(store.users(), search.as_deref().unwrap_or(""));
            let page = paginate(&matched, page, per_page);

            if format == OutputFormat::Table {
                let rows: Vec<_> = page.items.iter().map(|u| row(store, u)).collect();
                output::print_list(&rows, format)?;
                if page.total_items > 0 {
                    output::print_info(&format!(
                        "Showing {} to {} of {} users (page {}/{})",
                        page.first_index(),
                        page.last_index(),
                        page.total_items,
                        page.page,
                        page.total_pages
                    ));
                }
            } else {
                output::print_item(&page, format)?;
            }
        }

        UserCommands::Show { id } => {
            ctx.require("view_users")?;
            let store = ctx.store();
            let id = UserId::new(id);
            let user = store.user(&id).ok_or_else(|| not_found("user", id.as_str()))?;
            let permissions = store.user_permissions(&id);

            if format != OutputFormat::Table {
                return output::print_item(
                    &serde_json::json!({ "user": user, "permissions": permissions }),
                    format,
                );
            }

            output::print_header(&user.name);
            output::print_detail("ID", user.id.as_str());
            output::print_detail("Email", &user.email);
            output::print_detail("Role", &role_label(store, user));
            output::print_detail("Active", &output::yes_no(user.is_active));
            output::print_detail("Created", &user.created_at.to_rfc3339());
            let teams: Vec<_> = user
                .team_ids
                .iter()
                .filter_map(|t| store.team(t))
                .map(|t| t.name.as_str())
                .collect();
            output::print_detail("Teams", &teams.join(", "));
            let names: Vec<_> = permissions.iter().map(|p| p.name.as_str()).collect();
            output::print_detail("Permissions", &names.join(", "));
        }

        UserCommands::Add {
            email,
            name,
            role,
            teams,
            inactive,
        } => {
            ctx.require("create_users")?;
            let mut input = NewUser::new(email, name, role).with_teams(teams);
            if inactive {
                input = input.inactive();
            }
            let input = input.validated().map_err(WardenError::from)?;

            if ctx.store().user_by_email(&input.email).is_some() {
                output::print_warning(&format!("Another user already uses {}", input.email));
            }
            if ctx.store().role(&input.role_id).is_none() {
                output::print_warning(&format!("Role {} does not exist", input.role_id));
            }

            let id = ctx.mutate(|s| s.add_user(input))?;
            report(format, "Created user", id.as_str())?;
        }

        UserCommands::Update {
            id,
            email,
            name,
            role,
            teams,
            active,
        } => {
            ctx.require("edit_users")?;
            let patch = UserPatch {
                email,
                name,
                role_id: role.map(Into::into),
                team_ids: teams.map(|t| t.into_iter().map(Into::into).collect()),
                is_active: active,
            };
            if patch.is_empty() {
                output::print_info("Nothing to update.");
                return Ok(());
            }
            let patch = patch.validated().map_err(WardenError::from)?;

            let id = UserId::new(id);
            if !ctx.mutate(|s| s.update_user(&id, patch))? {
                return Err(not_found("user", id.as_str()));
            }
            report(format, "Updated user", id.as_str())?;
        }

        UserCommands::Delete { id } => {
            ctx.require("delete_users")?;
            let id = UserId::new(id);
            if !ctx.mutate(|s| s.delete_user(&id))? {
                return Err(not_found("user", id.as_str()));
            }
            report(format, "Deleted user", id.as_str())?;
        }
    }

    Ok(())
}
