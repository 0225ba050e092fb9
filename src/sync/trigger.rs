//! Decides whether regeneration is needed and drives it.
//!
//! The entry point for build-tool hooks: cheap no-op outside intrig
//! projects, hash-verify round-trip when a cache exists, full streamed
//! regeneration otherwise.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use intrig_types::GenerateEvent;

use crate::discovery::lifecycle::LifecycleController;
use crate::error::Result;
use crate::sync::client::DaemonApi;

/// Files that mark a directory as an intrig project.
const PROJECT_MARKERS: &[&str] = &["intrig.config.ts", "intrig.config.js", "intrig.json"];

/// Per-project cache of content hashes keyed by generator namespace.
const HASH_CACHE_FILE: &str = ".intrig/hashes.json";

/// Downstream build cache that may reference previously generated artifacts.
const BUILD_CACHE_DIR: &str = "node_modules/.cache/intrig";

/// What a sync run ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The directory is not an intrig project; nothing was contacted.
    Skipped,
    /// The daemon confirmed the cached hashes; artifacts are current.
    UpToDate,
    /// A regeneration ran to completion.
    Regenerated,
}

pub struct ChangeDetector {
    controller: LifecycleController,
    api: DaemonApi,
}

impl ChangeDetector {
    pub fn new(controller: LifecycleController, api: DaemonApi) -> Self {
        Self { controller, api }
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    /// Run the full check-and-regenerate sequence for `project_dir`.
    ///
    /// With `force`, the verify round-trip is skipped and regeneration runs
    /// unconditionally. Progress events are relayed to `on_event`.
    pub async fn sync<F>(&self, project_dir: &Path, force: bool, on_event: F) -> Result<SyncOutcome>
    where
        F: FnMut(&GenerateEvent),
    {
        if !has_project_marker(project_dir) {
            debug!(
                "{} has no intrig project marker, skipping",
                project_dir.display()
            );
            return Ok(SyncOutcome::Skipped);
        }

        // Always go through the full lifecycle: the instance may need an
        // auto-start, and a stale URL is never trusted without a probe.
        let project = self.controller.get_project(project_dir).await?;

        if !force {
            match read_hash_cache(&project.path) {
                Some(hashes) => {
                    if self.api.verify(&project.url, &hashes).await? {
                        info!("{} is up to date", project.project_name);
                        return Ok(SyncOutcome::UpToDate);
                    }
                }
                // No cache means the generated state is unknown; regenerate
                // without asking.
                None => debug!("no hash cache under {}", project.path.display()),
            }
        }

        self.api.generate(&project.url, on_event).await?;
        invalidate_build_caches(&project.path);
        info!("regenerated {}", project.project_name);
        Ok(SyncOutcome::Regenerated)
    }
}

/// Whether `dir` contains any recognizable intrig project marker.
pub fn has_project_marker(dir: &Path) -> bool {
    PROJECT_MARKERS.iter().any(|m| dir.join(m).is_file())
}

/// Read the per-project hash cache. Absent or unreadable caches are `None`:
/// the state is unknown, not an error.
fn read_hash_cache(root: &Path) -> Option<HashMap<String, String>> {
    let path = root.join(HASH_CACHE_FILE);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(hashes) => Some(hashes),
        Err(e) => {
            debug!("ignoring unreadable hash cache {}: {}", path.display(), e);
            None
        }
    }
}

/// Drop downstream build caches that may still reference old artifacts.
/// Best-effort: a failure here must not undo a successful regeneration.
fn invalidate_build_caches(root: &Path) {
    let cache_dir = root.join(BUILD_CACHE_DIR);
    if !cache_dir.exists() {
        return;
    }
    match std::fs::remove_dir_all(&cache_dir) {
        Ok(()) => debug!("invalidated build cache {}", cache_dir.display()),
        Err(e) => warn!(
            "failed to invalidate build cache {}: {}",
            cache_dir.display(),
            e
        ),
    }
}
