//! JSON snapshot file with atomic replacement.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::snapshot::{Snapshot, SNAPSHOT_VERSION};
use super::SnapshotStore;
use crate::error::{ErrorCode, Result, WardenError};

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Snapshot stored as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: true,
        }
    }

    /// Write indented JSON (the default) or a compact single line.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path written before the final rename.
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(TMP_SUFFIX);
        self.path.with_file_name(name)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn write_error(&self, error: std::io::Error) -> WardenError {
        WardenError::with_internal(
            ErrorCode::SnapshotWriteFailed,
            format!("Failed to write snapshot {}", self.path.display()),
            error.to_string(),
        )
        .with_source(error)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot file");
                return Ok(None);
            }
            Err(e) => {
                return Err(WardenError::with_internal(
                    ErrorCode::SnapshotReadFailed,
                    format!("Failed to read snapshot {}", self.path.display()),
                    e.to_string(),
                )
                .with_source(e))
            }
        };

        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        if !snapshot.is_supported() {
            return Err(WardenError::unsupported_snapshot_version(
                snapshot.version,
                SNAPSHOT_VERSION,
            )
            .with_context("path", self.path.display().to_string()));
        }

        debug!(
            path = %self.path.display(),
            users = snapshot.users.len(),
            roles = snapshot.roles.len(),
            "Loaded snapshot"
        );
        Ok(Some(snapshot))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let json = if self.pretty {
            serde_json::to_string_pretty(snapshot)?
        } else {
            serde_json::to_string(snapshot)?
        };

        let tmp_path = self.tmp_path();
        let mut tmp_file = File::create(&tmp_path).map_err(|e| self.write_error(e))?;
        tmp_file
            .write_all(json.as_bytes())
            .and_then(|_| tmp_file.sync_all())
            .map_err(|e| self.write_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.write_error(e))?;

        info!(path = %self.path.display(), "Saved snapshot");
        Ok(())
    }
}
