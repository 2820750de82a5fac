//! Subcommand implementations.

pub mod access;
pub mod config;
pub mod permission;
pub mod role;
pub mod team;
pub mod user;

use anyhow::Result;
use chrono::{DateTime, Utc};
use warden_core::WardenError;

use crate::output::{self, OutputFormat};

/// Calendar date used in table cells.
pub(crate) fn short_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub(crate) fn not_found(kind: &str, id: &str) -> anyhow::Error {
    WardenError::not_found(kind, id).into()
}

/// Confirmation line for a mutation, or `{ "id": ... }` in JSON/YAML.
pub(crate) fn report(format: OutputFormat, action: &str, id: &str) -> Result<()> {
    match format {
        OutputFormat::Table => {
            output::print_success(&format!("{} {}", action, id));
            Ok(())
        }
        _ => output::print_item(&serde_json::json!({ "id": id }), format),
    }
}
