//! Filesystem store for daemon discovery records.
//!
//! The registry is a per-user directory under the OS temp dir holding one
//! JSON file per known daemon instance. Writes are whole-file overwrites
//! with no partial-write protocol, so every reader tolerates corrupt or
//! half-written files by skipping them. A file's existence never implies a
//! live daemon; that is always the liveness probe's call.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use intrig_types::{DiscoveryMetadata, sanitize_name};

use crate::error::{IntrigError, Result};

/// Environment override for the registry directory (tests and tooling).
pub const REGISTRY_DIR_ENV: &str = "INTRIG_REGISTRY_DIR";

const REGISTRY_DIR_SUFFIX: &str = ".intrig";

/// Store for discovery records, rooted at one registry directory.
///
/// Explicitly constructed and passed around; there is no process-wide
/// registry singleton.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    dir: PathBuf,
}

impl RegistryStore {
    /// Store rooted at the default per-user directory,
    /// `<tmpdir>/<sanitized-username>.intrig/`. `INTRIG_REGISTRY_DIR`
    /// overrides the location when set.
    pub fn new() -> Self {
        if let Ok(dir) = std::env::var(REGISTRY_DIR_ENV)
            && !dir.is_empty()
        {
            return Self {
                dir: PathBuf::from(dir),
            };
        }
        Self {
            dir: default_registry_dir(),
        }
    }

    /// Store rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List every valid record in the registry.
    ///
    /// A missing directory is an empty registry, not an error. Entries that
    /// are not `.json`, fail to parse, are missing required fields, or carry
    /// an unusable port are skipped with a debug log so one corrupt file
    /// never hides the others.
    pub fn scan(&self) -> Result<Vec<DiscoveryMetadata>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            IntrigError::Registry(format!("failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("skipping unreadable registry entry {}: {}", path.display(), e);
                    continue;
                }
            };

            match serde_json::from_str::<DiscoveryMetadata>(&content) {
                Ok(record) if record.port != 0 => records.push(record),
                Ok(record) => {
                    debug!(
                        "skipping registry entry {} with unusable port {}",
                        path.display(),
                        record.port
                    );
                }
                Err(e) => {
                    debug!("skipping invalid registry entry {}: {}", path.display(), e);
                }
            }
        }

        Ok(records)
    }

    /// Write a record, creating the registry directory if needed.
    ///
    /// The file name is canonical per project root, so repeated restarts of
    /// the same project (with different ports and pids) overwrite one file
    /// instead of accumulating entries.
    pub fn write(&self, record: &DiscoveryMetadata) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            IntrigError::Registry(format!("failed to create {}: {}", self.dir.display(), e))
        })?;

        let path = self.file_path_for(&record.path);
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, content).map_err(|e| {
            IntrigError::Registry(format!("failed to write {}: {}", path.display(), e))
        })?;

        debug!("registered {} at {}", record.project_name, path.display());
        Ok(path)
    }

    /// Best-effort removal of a registry file.
    ///
    /// Deregistration must never fail the caller: a stale file is harmless
    /// because readers probe before trusting it.
    pub fn remove(&self, file: &Path) {
        match std::fs::remove_file(file) {
            Ok(()) => debug!("removed registry entry {}", file.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove registry entry {}: {}", file.display(), e),
        }
    }

    /// Canonical registry file for a project root:
    /// `<sanitized dirname>-<first 8 hex chars of SHA-256(normalized path)>.json`.
    pub fn file_path_for(&self, project_root: &Path) -> PathBuf {
        let normalized = normalize_path(project_root);

        let mut hasher = Sha256::new();
        hasher.update(normalized.to_string_lossy().as_bytes());
        let hash = hex::encode(hasher.finalize());

        let dirname = normalized
            .file_name()
            .and_then(|n| n.to_str())
            .map(sanitize_name)
            .unwrap_or_else(|| "project".to_string());

        self.dir.join(format!("{}-{}.json", dirname, &hash[..8]))
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The default per-user registry directory.
pub fn default_registry_dir() -> PathBuf {
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string());
    std::env::temp_dir().join(format!("{}{}", sanitize_name(&username), REGISTRY_DIR_SUFFIX))
}

/// Normalize to an absolute path.
///
/// Relative inputs are joined onto the current directory; symlinks are
/// resolved when the path exists, and the lexical absolute path is kept
/// otherwise so unregistered paths still normalize deterministically.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    std::fs::canonicalize(&absolute).unwrap_or(absolute)
}
