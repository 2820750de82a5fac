#![allow(clippy::result_large_err)]
//! # Warden Core
//!
//! Role-based authorization store for administrative tooling.
//!
//! ## Architecture
//!
//! - **RBAC**: Users, Roles, Permissions and Teams in an owned store, with
//!   User → Role → Permission resolution and a single-user session
//! - **Persistence**: JSON snapshots written after every mutation
//! - **Validation**: Form rules for creation inputs and patches
//! - **Config**: Layered file + environment configuration
//! - **Telemetry**: Structured logging and metric descriptions
//!
//! ```rust
//! use warden_core::prelude::*;
//!
//! let mut store = AuthStore::seeded();
//! assert!(store.login("superadmin@example.com", "test123"));
//!
//! let me = store.current_user().map(|u| u.id.clone()).unwrap();
//! assert!(store.has_permission(&me, "manage_permissions"));
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod rbac;
pub mod telemetry;
pub mod validation;

pub use error::{ErrorCode, ErrorDetails, ErrorSeverity, Result, WardenError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{ErrorCode, Result, WardenError};
    pub use crate::persistence::{JsonFileStore, MemoryStore, PersistentStore, Snapshot, SnapshotStore};
    pub use crate::rbac::{
        authorize, navigation, Access, Action, AuthStore, Capabilities, DeletionPolicy,
        NewPermission, NewRole, NewTeam, NewUser, Permission, PermissionId, PermissionPatch,
        PolicyDecision, Resource, Role, RoleId, RolePatch, SeedData, Team, TeamId, TeamPatch,
        User, UserId, UserPatch,
    };
    pub use crate::validation::{Validate, ValidationErrors};
}
