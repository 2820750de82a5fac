//! Team management commands.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use warden_core::rbac::views::team_members;
use warden_core::rbac::{AuthStore, NewTeam, Patch, Team, TeamId, TeamPatch, UserId};
use warden_core::validation::Validate;
use warden_core::WardenError;

use super::{not_found, report, short_date};
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List teams
    List,

    /// Show a team and its members
    Show {
        /// Team ID
        id: String,
    },

    /// Create a team
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// Member user ID (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,
    },

    /// Update fields of a team
    Update {
        /// Team ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Replace the member list (comma-separated user IDs)
        #[arg(long, value_delimiter = ',')]
        members: Option<Vec<String>>,
    },

    /// Delete a team
    Delete {
        /// Team ID
        id: String,
    },
}

#[derive(Serialize, Tabled)]
struct TeamRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Members")]
    members: usize,
    #[tabled(rename = "Created")]
    created: String,
}

fn row(store: &AuthStore, team: &Team) -> TeamRow {
    TeamRow {
        id: team.id.to_string(),
        name: team.name.clone(),
        description: team.description.clone(),
        members: team_members(store, team).len(),
        created: short_date(&team.created_at),
    }
}

fn warn_unknown_members(store: &AuthStore, ids: &[UserId]) {
    for id in ids.iter().filter(|id| store.user(id).is_none()) {
        output::print_warning(&format!("User {} does not exist", id));
    }
}

pub fn execute(cmd: TeamCommands, ctx: &mut Context) -> Result<()> {
    let format = ctx.format;
    match cmd {
        TeamCommands::List => {
            ctx.require("view_teams")?;
            let store = ctx.store();
            if format == OutputFormat::Table {
                let rows: Vec<_> = store.teams().iter().map(|t| row(store, t)).collect();
                output::print_list(&rows, format)?;
            } else {
                output::print_item(store.teams(), format)?;
            }
        }

        TeamCommands::Show { id } => {
            ctx.require("view_teams")?;
            let store = ctx.store();
            let id = TeamId::new(id);
            let team = store.team(&id).ok_or_else(|| not_found("team", id.as_str()))?;
            let members = team_members(store, team);

            if format != OutputFormat::Table {
                return output::print_item(
                    &serde_json::json!({ "team": team, "members": members }),
                    format,
                );
            }

            output::print_header(&team.name);
            output::print_detail("ID", team.id.as_str());
            output::print_detail("Description", &team.description);
            output::print_detail("Created", &team.created_at.to_rfc3339());
            let names: Vec<_> = members
                .iter()
                .map(|u| format!("{} <{}>", u.name, u.email))
                .collect();
            output::print_detail("Members", &names.join(", "));
        }

        TeamCommands::Add {
            name,
            description,
            members,
        } => {
            ctx.require("create_teams")?;
            let input = NewTeam::new(name, description)
                .with_members(members)
                .validated()
                .map_err(WardenError::from)?;
            warn_unknown_members(ctx.store(), &input.user_ids);

            let id = ctx.mutate(|s| s.add_team(input))?;
            report(format, "Created team", id.as_str())?;
        }

        TeamCommands::Update {
            id,
            name,
            description,
            members,
        } => {
            ctx.require("edit_teams")?;
            let patch = TeamPatch {
                name,
                description,
                user_ids: members.map(|m| m.into_iter().map(Into::into).collect()),
            };
            if patch.is_empty() {
                output::print_info("Nothing to update.");
                return Ok(());
            }
            let patch = patch.validated().map_err(WardenError::from)?;
            if let Some(ids) = &patch.user_ids {
                warn_unknown_members(ctx.store(), ids);
            }

            let id = TeamId::new(id);
            if !ctx.mutate(|s| s.update_team(&id, patch))? {
                return Err(not_found("team", id.as_str()));
            }
            report(format, "Updated team", id.as_str())?;
        }

        TeamCommands::Delete { id } => {
            ctx.require("delete_teams")?;
            let id = TeamId::new(id);
            if !ctx.mutate(|s| s.delete_team(&id))? {
                return Err(not_found("team", id.as_str()));
            }
            report(format, "Deleted team", id.as_str())?;
        }
    }

    Ok(())
}
