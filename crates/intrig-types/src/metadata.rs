use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Registry record a daemon instance publishes about itself.
///
/// One JSON file per live instance lives in the per-user registry directory.
/// Field names are camelCase on the wire so that non-Rust daemon bindings
/// read and write the same files.
///
/// A record on disk does **not** guarantee a live process: a daemon that
/// dies without cleanup leaves its file behind. Callers must re-check
/// liveness with a TCP probe before trusting `url`/`port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMetadata {
    /// Sanitized project name (only `[A-Za-z0-9_-]`).
    pub project_name: String,
    /// Base URL of the daemon's HTTP API, e.g. `http://127.0.0.1:5050`.
    pub url: String,
    /// The actually bound port (1-65535). Supports "let the OS pick" startup:
    /// the daemon registers whatever it ended up bound to.
    pub port: u16,
    /// OS process id at registration time. Diagnostic only, never trusted
    /// for liveness.
    pub pid: u32,
    /// RFC 3339 registration time.
    pub timestamp: String,
    /// Absolute project root directory.
    pub path: PathBuf,
    /// Free-form tag identifying the project's framework binding
    /// (e.g. "next", "react", "nest").
    #[serde(rename = "type")]
    pub kind: String,
}

impl DiscoveryMetadata {
    /// Build a record for the current moment.
    ///
    /// `url` is derived from the bound port; `timestamp` is stamped with the
    /// current UTC time.
    pub fn new(
        project_name: impl Into<String>,
        port: u16,
        pid: u32,
        path: PathBuf,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            url: format!("http://127.0.0.1:{}", port),
            port,
            pid,
            timestamp: chrono::Utc::now().to_rfc3339(),
            path,
            kind: kind.into(),
        }
    }
}

/// Resolved view of a project, produced fresh on every resolution.
///
/// Never persisted; `running` reflects the liveness probe at the moment of
/// resolution and goes stale immediately after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub project_name: String,
    pub path: PathBuf,
    pub url: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub kind: String,
    pub running: bool,
    pub metadata: DiscoveryMetadata,
}

impl ProjectInfo {
    pub fn from_metadata(metadata: DiscoveryMetadata, running: bool) -> Self {
        Self {
            project_name: metadata.project_name.clone(),
            path: metadata.path.clone(),
            url: metadata.url.clone(),
            port: metadata.port,
            kind: metadata.kind.clone(),
            running,
            metadata,
        }
    }
}
