//! Store access shared by all store commands.
//!
//! Without `--as` the CLI acts as the local operator and no permission checks
//! apply. With `--as` it signs in first and guards every command with the
//! permission the matching admin screen requires.

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use warden_core::config::Config;
use warden_core::persistence::{JsonFileStore, PersistentStore};
use warden_core::rbac::{authorize, AuthStore};
use warden_core::WardenError;

use crate::output::OutputFormat;

/// Credentials supplied with `--as` / `--password`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
    pub password: String,
}

pub struct Context {
    store: PersistentStore<JsonFileStore>,
    pub format: OutputFormat,
    acting: bool,
}

impl Context {
    /// Open the configured snapshot and sign in as `identity`, if given.
    pub fn open(config: &Config, identity: Option<Identity>, format: OutputFormat) -> Result<Self> {
        let path: PathBuf = config.store.snapshot_path.clone();
        let mut store = config
            .open_store()
            .with_context(|| format!("Failed to open snapshot {}", path.display()))?;

        let acting = match identity {
            Some(identity) => {
                if !store.login(&identity.email, &identity.password) {
                    return Err(WardenError::unauthorized("Invalid email or password").into());
                }
                true
            }
            None => false,
        };

        Ok(Self {
            store,
            format,
            acting,
        })
    }

    pub fn store(&self) -> &AuthStore {
        self.store.store()
    }

    /// Whether commands run on behalf of a signed-in user.
    pub fn is_acting(&self) -> bool {
        self.acting
    }

    /// Fail with `Forbidden` / `Unauthorized` unless the signed-in user holds
    /// `permission`. Always passes for the local operator.
    pub fn require(&self, permission: &str) -> Result<()> {
        if !self.acting {
            return Ok(());
        }
        authorize(self.store(), Some(permission)).into_result()?;
        Ok(())
    }

    /// Apply a mutation and save the snapshot.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut AuthStore) -> T) -> Result<T> {
        self.store.mutate(f).context("Failed to save snapshot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use warden_core::config::StoreConfig;
    use warden_core::rbac::NewTeam;
    use warden_core::ErrorCode;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            store: StoreConfig {
                snapshot_path: dir.path().join("warden.json"),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn superadmin() -> Identity {
        Identity {
            email: "superadmin@example.com".to_string(),
            password: "test123".to_string(),
        }
    }

    fn code_of(err: &anyhow::Error) -> Option<ErrorCode> {
        err.downcast_ref::<WardenError>().map(|e| e.code())
    }

    #[test]
    fn test_local_operator_skips_checks() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::open(&config_in(&dir), None, OutputFormat::Table).unwrap();
        assert!(!ctx.is_acting());
        assert!(ctx.require("manage_permissions").is_ok());
    }

    #[test]
    fn test_wrong_password_is_unauthorized() {
        let dir = TempDir::new().unwrap();
        let identity = Identity {
            password: "wrong".to_string(),
            ..superadmin()
        };
        let err = Context::open(&config_in(&dir), Some(identity), OutputFormat::Table)
            .err()
            .unwrap();
        assert_eq!(code_of(&err), Some(ErrorCode::Unauthorized));
    }

    #[test]
    fn test_acting_user_is_checked() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::open(&config_in(&dir), Some(superadmin()), OutputFormat::Json).unwrap();
        assert!(ctx.is_acting());
        assert!(ctx.require("manage_permissions").is_ok());

        let err = ctx.require("launch_rockets").unwrap_err();
        assert_eq!(code_of(&err), Some(ErrorCode::Forbidden));
    }

    #[test]
    fn test_mutations_are_saved() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let team = {
            let mut ctx = Context::open(&config, None, OutputFormat::Table).unwrap();
            ctx.mutate(|s| s.add_team(NewTeam::new("Ops", "Operations"))).unwrap()
        };

        let ctx = Context::open(&config, None, OutputFormat::Table).unwrap();
        assert_eq!(ctx.store().team(&team).map(|t| t.name.as_str()), Some("Ops"));
    }
}
