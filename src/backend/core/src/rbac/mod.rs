//! Role-based access control.
//!
//! This module provides:
//! - **Models**: Permission, Role, User, Team and their create/patch inputs
//! - **Store**: the owned collections plus the session, with CRUD and resolution
//! - **Policy**: reasoned checks over the store and the protected-role rule
//! - **Guard**: access decisions for protected views and the navigation menu
//! - **Views**: grouping, counting, search and paging for listings
//! - **Seed**: the first-run catalogue
//!
//! # Usage
//!
//! ```rust
//! use warden_core::rbac::{AuthStore, NewUser};
//!
//! let mut store = AuthStore::seeded();
//! let id = store.add_user(NewUser::new("ada@example.com", "Ada", "admin"));
//!
//! assert!(store.has_permission(&id, "edit_users"));
//! assert!(!store.has_permission(&id, "delete_users"));
//! ```

pub mod collection;
pub mod credentials;
pub mod guard;
pub mod models;
pub mod policy;
pub mod seed;
pub mod session;
pub mod store;
pub mod views;

pub use collection::Collection;
pub use credentials::{Credential, CredentialVerifier, StaticCredentials};
pub use guard::{authorize, navigation, Access, Section, SECTIONS};
pub use models::{
    permission_name, Action, Entity, NewPermission, NewRole, NewTeam, NewUser, Patch, Permission,
    PermissionId, PermissionPatch, Resource, Role, RoleId, RolePatch, Team, TeamId, TeamPatch,
    User, UserId, UserPatch,
};
pub use policy::{DeletionPolicy, PolicyDecision};
pub use seed::{SeedData, SeedRole, SUPERADMIN_ID};
pub use session::Session;
pub use store::AuthStore;
pub use views::{Capabilities, Page, DEFAULT_PAGE_SIZE};
