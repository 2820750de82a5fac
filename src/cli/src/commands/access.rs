//! Snapshot initialisation and permission queries.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use warden_core::config::Config;
use warden_core::persistence::{Snapshot, SnapshotStore};
use warden_core::rbac::{navigation, Capabilities, PolicyDecision, Resource, SeedData, UserId};

use super::not_found;
use crate::context::Context;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing snapshot
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// User ID
    pub user: String,

    /// Permission name, e.g. `edit_users`
    pub permission: String,
}

#[derive(Args)]
pub struct PermsArgs {
    /// User ID
    pub user: String,
}

#[derive(Serialize, Tabled)]
struct PermissionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Serialize, Tabled)]
struct CapabilityRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "View")]
    view: String,
    #[tabled(rename = "Create")]
    create: String,
    #[tabled(rename = "Edit")]
    edit: String,
    #[tabled(rename = "Delete")]
    delete: String,
}

/// Write the seed catalogue to the configured snapshot path.
pub fn init(args: InitArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut backend = config.snapshot_store();
    if backend.exists() && !args.force {
        bail!(
            "Snapshot {} already exists (use --force to overwrite)",
            backend.path().display()
        );
    }

    backend.save(&Snapshot::from(SeedData::standard()))?;

    let path = backend.path().display().to_string();
    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Wrote seed snapshot to {}", path));
            Ok(())
        }
        _ => output::print_item(&serde_json::json!({ "path": path }), format),
    }
}

/// Evaluate one permission for one user. A denial is reported as an error.
pub fn check(args: CheckArgs, ctx: &Context) -> Result<()> {
    ctx.require("view_users")?;
    let store = ctx.store();
    let user_id = UserId::new(args.user);
    let decision = store.check(&user_id, &args.permission);

    match ctx.format {
        OutputFormat::Table => {
            if decision.is_allowed() {
                output::print_success(&format!("{} has {}", user_id, args.permission));
            }
        }
        format => {
            let reason = match &decision {
                PolicyDecision::Allow => None,
                PolicyDecision::Deny(reason) => Some(reason.as_str()),
            };
            output::print_item(
                &serde_json::json!({
                    "user": user_id,
                    "permission": args.permission,
                    "allowed": decision.is_allowed(),
                    "reason": reason,
                }),
                format,
            )?;
        }
    }

    store.enforce(&user_id, &args.permission)?;
    Ok(())
}

/// List a user's effective permissions.
pub fn perms(args: PermsArgs, ctx: &Context) -> Result<()> {
    ctx.require("view_users")?;
    let store = ctx.store();
    let user_id = UserId::new(args.user);
    if store.user(&user_id).is_none() {
        return Err(not_found("user", user_id.as_str()));
    }

    let permissions = store.user_permissions(&user_id);
    if ctx.format != OutputFormat::Table {
        return output::print_item(&permissions, ctx.format);
    }

    if store.user_role(&user_id).is_none() {
        output::print_warning(&format!("User {} has no resolvable role", user_id));
    }
    let rows: Vec<_> = permissions
        .iter()
        .map(|p| PermissionRow {
            name: p.name.clone(),
            resource: p.resource.clone(),
            action: p.action.clone(),
            description: p.description.clone(),
        })
        .collect();
    output::print_list(&rows, ctx.format)
}

/// Describe the signed-in user: role, reachable sections and capabilities.
pub fn whoami(ctx: &Context) -> Result<()> {
    if !ctx.is_acting() {
        bail!("whoami needs a signed-in user (pass --as <EMAIL>)");
    }
    let store = ctx.store();
    let Some(user) = store.current_user() else {
        bail!("The signed-in user no longer exists");
    };

    let role = store.user_role(&user.id);
    let sections = navigation(store);
    let capabilities: Vec<_> = Resource::all()
        .into_iter()
        .map(|r| (r, Capabilities::resolve(store, &user.id, r)))
        .collect();

    if ctx.format != OutputFormat::Table {
        let caps: serde_json::Map<_, _> = capabilities
            .iter()
            .map(|(r, c)| (r.as_str().to_string(), serde_json::json!(c)))
            .collect();
        return output::print_item(
            &serde_json::json!({
                "user": user,
                "role": role,
                "sections": sections,
                "capabilities": caps,
            }),
            ctx.format,
        );
    }

    output::print_header(&user.name);
    output::print_detail("ID", user.id.as_str());
    output::print_detail("Email", &user.email);
    output::print_detail(
        "Role",
        role.map(|r| r.name.as_str()).unwrap_or("(none)"),
    );
    let names: Vec<_> = sections.iter().map(|s| s.name).collect();
    output::print_detail("Sections", &names.join(", "));
    println!();

    let rows: Vec<_> = capabilities
        .iter()
        .map(|(r, c)| CapabilityRow {
            resource: r.as_str().to_string(),
            view: output::yes_no(c.can_view),
            create: output::yes_no(c.can_create),
            edit: output::yes_no(c.can_edit),
            delete: output::yes_no(c.can_delete),
        })
        .collect();
    output::print_list(&rows, ctx.format)
}
