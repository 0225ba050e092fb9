//! Daemon-side self-registration.
//!
//! This code runs inside the daemon process, not the client. Once the daemon
//! has bound its listening socket (including the "ask the OS for a free
//! port" mode), it writes its own discovery record with the actually bound
//! port; on graceful shutdown it removes that record again. An abnormal
//! death leaves the file behind on purpose: readers classify instances by
//! probing the port, never by the file's mere existence, so a stale record
//! costs nothing but a failed probe.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use intrig_types::{DiscoveryMetadata, sanitize_name};

use crate::discovery::registry::{RegistryStore, normalize_path};
use crate::error::Result;

const DEFAULT_PROJECT_NAME: &str = "intrig";

/// Handle to this daemon's own registry record.
pub struct RegistrationHandle {
    store: RegistryStore,
    file_path: PathBuf,
    metadata: DiscoveryMetadata,
}

/// Register the current process as the daemon for `project_root`.
///
/// The project name comes from the local `package.json` descriptor, falling
/// back to the root directory's name, then to a fixed default; it is
/// sanitized before use. `port` must be the actually bound port.
pub fn register(
    store: &RegistryStore,
    project_root: &Path,
    port: u16,
    kind: &str,
) -> Result<RegistrationHandle> {
    let root = normalize_path(project_root);
    let name = sanitize_name(&project_name_for(&root));

    let metadata = DiscoveryMetadata::new(name, port, std::process::id(), root, kind);
    let file_path = store.write(&metadata)?;

    info!(
        "registered daemon {} on port {} ({})",
        metadata.project_name,
        metadata.port,
        file_path.display()
    );

    Ok(RegistrationHandle {
        store: store.clone(),
        file_path,
        metadata,
    })
}

impl RegistrationHandle {
    pub fn metadata(&self) -> &DiscoveryMetadata {
        &self.metadata
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Remove this daemon's record. Best-effort: a failure is logged and
    /// swallowed, since a dead port classifies as not-running regardless of
    /// the file.
    pub fn deregister(self) {
        info!("deregistering {}", self.metadata.project_name);
        self.store.remove(&self.file_path);
    }

    /// Wait for a shutdown signal (SIGTERM/SIGINT on Unix, ctrl-c on
    /// Windows), then deregister.
    ///
    /// Meant to be spawned or selected alongside the daemon's serve loop.
    pub async fn deregister_on_shutdown(self) -> Result<()> {
        wait_for_shutdown().await?;
        self.deregister();
        Ok(())
    }
}

/// Project name from the local descriptor, with fallbacks.
fn project_name_for(root: &Path) -> String {
    if let Some(name) = package_descriptor_name(root) {
        return name;
    }
    root.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            warn!(
                "could not derive a project name for {}, using default",
                root.display()
            );
            DEFAULT_PROJECT_NAME.to_string()
        })
}

fn package_descriptor_name(root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(root.join("package.json")).ok()?;
    let descriptor: serde_json::Value = serde_json::from_str(&content).ok()?;
    descriptor
        .get("name")
        .and_then(|n| n.as_str())
        .map(str::to_string)
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).map_err(crate::error::IntrigError::Io)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(crate::error::IntrigError::Io)?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
    Ok(())
}

#[cfg(windows)]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(crate::error::IntrigError::Io)?;
    info!("received ctrl-c");
    Ok(())
}
