//! Warden CLI - Command-line interface for administering access control.
//!
//! Provides commands for users, roles, permissions, teams, permission checks,
//! and CLI configuration.

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{access, config, permission, role, team, user};
use context::{Context, Identity};
use output::OutputFormat;
use warden_core::telemetry::{init_telemetry, TelemetryConfig};
use warden_core::config::Config;
use warden_core::WardenError;

/// Warden - Role-based access control administration
#[derive(Parser)]
#[command(
    name = "warden",
    author = "Aezi <aezi.zhu@icloud.com>",
    version = "0.1.0",
    about = "Warden - Role-based access control administration",
    long_about = "CLI tool for managing users, roles, permissions and teams stored in a Warden snapshot.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Snapshot file
    #[arg(long, global = true, env = "WARDEN_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Core configuration file (TOML)
    #[arg(long, global = true, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Act as this user; commands are then checked against their permissions
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    acting_as: Option<String>,

    /// Password for --as
    #[arg(long, global = true, env = "WARDEN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management operations
    #[command(subcommand)]
    User(user::UserCommands),

    /// Role management operations
    #[command(subcommand)]
    Role(role::RoleCommands),

    /// Permission management operations
    #[command(subcommand)]
    Permission(permission::PermissionCommands),

    /// Team management operations
    #[command(subcommand)]
    Team(team::TeamCommands),

    /// Write the seed snapshot
    Init(access::InitArgs),

    /// Check whether a user holds a permission
    Check(access::CheckArgs),

    /// List a user's effective permissions
    Perms(access::PermsArgs),

    /// Show the signed-in user's sections and capabilities
    Whoami,

    /// CLI configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

/// Resolve the core configuration: `--config`, then the CLI config file's
/// `config` key, then environment only. `--snapshot` and the `snapshot` key
/// override the snapshot path.
fn load_core_config(cli: &Cli) -> Result<Config> {
    let saved = config::load_config()?;

    let mut core = match cli.config.clone().or_else(|| saved.path_value("config")) {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if let Some(path) = cli.snapshot.clone().or_else(|| saved.path_value("snapshot")) {
        core.store.snapshot_path = path;
    }

    if cli.verbose {
        core.logging.level = "debug".to_string();
    } else if std::env::var_os("RUST_LOG").is_none() {
        core.logging.level = "warn".to_string();
    }

    Ok(core)
}

fn identity(cli: &Cli) -> Option<Identity> {
    cli.acting_as.as_ref().map(|email| Identity {
        email: email.clone(),
        password: cli.password.clone().unwrap_or_default(),
    })
}

fn run(cli: Cli) -> Result<()> {
    let format = cli.output;

    // CLI configuration does not touch the store.
    if let Commands::Config(cmd) = cli.command {
        return config::execute(cmd, format);
    }

    let core = load_core_config(&cli)?;
    init_telemetry(&TelemetryConfig::new(core.logging.clone()))?;

    if let Commands::Init(args) = cli.command {
        return access::init(args, &core, format);
    }

    let mut ctx = Context::open(&core, identity(&cli), format)?;

    match cli.command {
        Commands::User(cmd) => user::execute(cmd, &mut ctx),
        Commands::Role(cmd) => role::execute(cmd, &mut ctx),
        Commands::Permission(cmd) => permission::execute(cmd, &mut ctx),
        Commands::Team(cmd) => team::execute(cmd, &mut ctx),
        Commands::Check(args) => access::check(args, &ctx),
        Commands::Perms(args) => access::perms(args, &ctx),
        Commands::Whoami => access::whoami(&ctx),
        Commands::Init(_) | Commands::Config(_) => unreachable!("handled above"),
    }
}

fn warden_error(error: &anyhow::Error) -> Option<&WardenError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<WardenError>())
}

/// Exit status for a failed command, taken from the first `WardenError` in
/// the chain.
fn exit_code(error: &anyhow::Error) -> i32 {
    warden_error(error).map_or(1, |e| e.code().exit_code())
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        if let Some(err) = warden_error(&e) {
            err.log();
        }
        output::print_error(&format!("{:#}", e));
        std::process::exit(exit_code(&e));
    }
}
