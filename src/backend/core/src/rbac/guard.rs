//! Access decisions for protected views.
//!
//! A front end asks the guard before rendering a section: is anyone signed
//! in, and does the signed-in user hold the section's permission? The guard
//! only reads the store; it never mutates the session.

use serde::Serialize;
use tracing::debug;

use super::models::User;
use super::store::AuthStore;
use crate::error::{Result, WardenError};

/// Outcome of guarding a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<'a> {
    /// Render the view for this user.
    Granted(&'a User),
    /// Nobody is signed in, or the signed-in user no longer exists.
    LoginRequired,
    /// Signed in, but lacking the required permission.
    Forbidden { permission: String },
}

impl<'a> Access<'a> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// Convert to a `Result`, mapping denials to `Unauthorized` / `Forbidden`.
    pub fn into_result(self) -> Result<&'a User> {
        match self {
            Self::Granted(user) => Ok(user),
            Self::LoginRequired => Err(WardenError::unauthorized("Sign in to continue")),
            Self::Forbidden { permission } => Err(WardenError::forbidden(format!(
                "You don't have permission to access this resource ({})",
                permission
            ))
            .with_context("permission", permission)),
        }
    }
}

/// Guard a view that optionally requires a named permission.
pub fn authorize<'a>(store: &'a AuthStore, permission: Option<&str>) -> Access<'a> {
    if !store.is_authenticated() {
        return Access::LoginRequired;
    }
    let Some(user) = store.current_user() else {
        return Access::LoginRequired;
    };

    match permission {
        Some(required) if !store.has_permission(&user.id, required) => {
            debug!(user_id = %user.id, permission = required, "View forbidden");
            Access::Forbidden {
                permission: required.to_string(),
            }
        }
        _ => Access::Granted(user),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Navigation
// ═══════════════════════════════════════════════════════════════════════════════

/// A top-level administrative section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: &'static str,
    pub path: &'static str,
    pub permission: &'static str,
}

/// The administrative sections, in menu order.
pub const SECTIONS: [Section; 4] = [
    Section {
        name: "Users",
        path: "/users",
        permission: "view_users",
    },
    Section {
        name: "Roles",
        path: "/roles",
        permission: "view_roles",
    },
    Section {
        name: "Permissions",
        path: "/permissions",
        permission: "view_permissions",
    },
    Section {
        name: "Teams",
        path: "/teams",
        permission: "view_teams",
    },
];

/// Sections the signed-in user may open. Empty when signed out.
pub fn navigation(store: &AuthStore) -> Vec<Section> {
    SECTIONS
        .iter()
        .filter(|s| authorize(store, Some(s.permission)).is_granted())
        .copied()
        .collect()
}
