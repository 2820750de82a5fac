//! Configuration management.
//!
//! Sources, later overriding earlier: built-in defaults, an optional TOML
//! file, then `WARDEN__`-prefixed environment variables with `__` between
//! nesting levels (e.g. `WARDEN__STORE__SNAPSHOT_PATH=/var/lib/warden.json`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::persistence::{JsonFileStore, PersistentStore};
use crate::rbac::credentials::{
    Credential, CredentialVerifier, StaticCredentials, SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD,
};
use crate::telemetry::LoggingConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WARDEN";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Snapshot storage
    #[serde(default)]
    pub store: StoreConfig,

    /// Accepted login credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON snapshot file
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Write the seed catalogue when no snapshot exists yet
    #[serde(default = "default_seed_if_missing")]
    pub seed_if_missing: bool,

    /// Indent the snapshot JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            seed_if_missing: default_seed_if_missing(),
            pretty: default_pretty(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Pairs the stand-in credential check accepts
    #[serde(default = "default_credentials")]
    pub credentials: Vec<Credential>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials: default_credentials(),
        }
    }
}

impl AuthConfig {
    pub fn verifier(&self) -> Arc<dyn CredentialVerifier> {
        Arc::new(StaticCredentials::new(self.credentials.clone()))
    }
}

// Default value functions
fn default_snapshot_path() -> PathBuf { PathBuf::from("warden.json") }
fn default_seed_if_missing() -> bool { true }
fn default_pretty() -> bool { true }
fn default_credentials() -> Vec<Credential> {
    vec![Credential::new(SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD)]
}

impl Config {
    /// Load configuration from the environment only.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// The snapshot file backend described by `store`.
    pub fn snapshot_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.store.snapshot_path).pretty(self.store.pretty)
    }

    /// Open the persistent store described by this configuration.
    pub fn open_store(&self) -> Result<PersistentStore<JsonFileStore>> {
        let store = PersistentStore::open(self.snapshot_store(), self.store.seed_if_missing)?;
        Ok(store.with_verifier(self.auth.verifier()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.snapshot_path, PathBuf::from("warden.json"));
        assert!(config.store.seed_if_missing);
        assert!(config.auth.verifier().verify("superadmin@example.com", "test123"));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("warden.toml");
        fs::write(
            &path,
            r#"
[store]
snapshot_path = "/tmp/state.json"
pretty = false

[[auth.credentials]]
email = "ops@example.com"
password = "hunter2"

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.store.snapshot_path, PathBuf::from("/tmp/state.json"));
        assert!(!config.store.pretty);
        assert!(config.store.seed_if_missing);
        assert_eq!(config.logging.level, "debug");

        let verifier = config.auth.verifier();
        assert!(verifier.verify("ops@example.com", "hunter2"));
        assert!(!verifier.verify("superadmin@example.com", "test123"));
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(err.code().category(), "configuration");
        assert_ne!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_open_store_seeds_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            store: StoreConfig {
                snapshot_path: dir.path().join("warden.json"),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut store = config.open_store().unwrap();
        assert!(dir.path().join("warden.json").exists());
        assert!(store.login("superadmin@example.com", "test123"));
    }
}
