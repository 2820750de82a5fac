//! Snapshot persistence for the authorization store.
//!
//! The store itself is purely in-memory. This module adds:
//! - **Snapshot**: the serializable form of the four collections
//! - **SnapshotStore**: where snapshots live (`JsonFileStore`, `MemoryStore`)
//! - **PersistentStore**: an `AuthStore` that writes a snapshot after every mutation
//!
//! The session is process-local and is never written.
//!
//! # Usage
//!
//! ```rust,no_run
//! use warden_core::persistence::{JsonFileStore, PersistentStore};
//! use warden_core::rbac::NewTeam;
//!
//! # fn main() -> warden_core::Result<()> {
//! let mut store = PersistentStore::open(JsonFileStore::new("warden.json"), true)?;
//! let team = store.mutate(|s| s.add_team(NewTeam::new("Ops", "Operations")))?;
//! assert!(store.store().team(&team).is_some());
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod snapshot;

pub use file::JsonFileStore;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};

use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::rbac::credentials::CredentialVerifier;
use crate::rbac::seed::SeedData;
use crate::rbac::store::AuthStore;

/// Backing storage for snapshots.
pub trait SnapshotStore {
    /// Load the stored snapshot, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// In-memory backend
// ═══════════════════════════════════════════════════════════════════════════════

/// Keeps the latest snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<Snapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            saves: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshot = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Persistent store
// ═══════════════════════════════════════════════════════════════════════════════

/// An [`AuthStore`] bound to a [`SnapshotStore`].
///
/// Reads go straight to the in-memory store. Every [`mutate`](Self::mutate)
/// saves the full snapshot afterwards; if that save fails the in-memory change
/// still stands and the error is returned.
#[derive(Debug)]
pub struct PersistentStore<S: SnapshotStore> {
    backend: S,
    store: AuthStore,
}

impl<S: SnapshotStore> PersistentStore<S> {
    /// Load from `backend`. When nothing is stored yet, start from the seed
    /// catalogue (and save it) if `seed_if_missing`, otherwise start empty.
    pub fn open(mut backend: S, seed_if_missing: bool) -> Result<Self> {
        let store = match backend.load()? {
            Some(snapshot) => snapshot.restore(),
            None if seed_if_missing => {
                let seed = SeedData::standard();
                let snapshot = Snapshot::from(seed);
                backend.save(&snapshot)?;
                info!("Initialized store from seed catalogue");
                snapshot.restore()
            }
            None => AuthStore::new(),
        };

        Ok(Self { backend, store })
    }

    /// Replace the credential check used by [`login`](Self::login).
    pub fn with_verifier(self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            store: self.store.with_verifier(verifier),
            ..self
        }
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Run `f` against the store, then save a snapshot.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut AuthStore) -> T) -> Result<T> {
        let out = f(&mut self.store);
        self.save()?;
        Ok(out)
    }

    /// Save the current collections.
    pub fn save(&mut self) -> Result<()> {
        self.backend.save(&Snapshot::capture(&self.store))
    }

    /// Sign in. Session changes are not persisted.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        self.store.login(email, password)
    }

    pub fn logout(&mut self) {
        self.store.logout();
    }

    pub fn into_inner(self) -> AuthStore {
        self.store
    }
}
