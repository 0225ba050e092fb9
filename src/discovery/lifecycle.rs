//! Auto-start and readiness orchestration.
//!
//! A resolution request runs a small state machine: resolve the registry
//! record, probe it, spawn the daemon detached if the probe fails, then poll
//! the recorded port until it is live or the startup budget elapses.
//!
//! Two callers resolving the same cold project at the same time may both
//! decide to spawn; there is no lock file or other mutual exclusion. Both
//! spawns may land. The canonical registry file name keeps the registry at
//! one record per root either way, and readers only ever trust the probed
//! port, so the race costs a redundant process, not correctness.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use intrig_types::{DiscoveryMetadata, ProjectInfo};

use crate::config::ClientConfig;
use crate::discovery::probe::LivenessProbe;
use crate::discovery::registry::RegistryStore;
use crate::discovery::resolver::Resolver;
use crate::error::{IntrigError, Result};

/// Seam for starting daemon processes, so tests can observe spawn calls
/// without forking anything.
pub trait DaemonSpawner: Send + Sync {
    /// Start the daemon for `metadata`, detached. Must not block on or own
    /// the daemon's lifetime.
    fn spawn(&self, metadata: &DiscoveryMetadata) -> Result<()>;
}

/// Runs the configured daemon start command, detached, rooted at the
/// project directory.
pub struct CommandSpawner {
    command: Vec<String>,
}

impl CommandSpawner {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl DaemonSpawner for CommandSpawner {
    fn spawn(&self, metadata: &DiscoveryMetadata) -> Result<()> {
        let (program, args) = self.command.split_first().ok_or_else(|| {
            IntrigError::InvalidArgument("daemon start command is empty".to_string())
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&metadata.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // On Unix, make the daemon a session leader so it survives this
        // process and any terminal it was started from.
        #[cfg(unix)]
        // SAFETY: setsid() is safe to call in pre_exec - it creates a new
        // session and process group, making this process the leader.
        unsafe {
            use std::os::unix::process::CommandExt;
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;

            const DETACHED_PROCESS: u32 = 0x00000008;
            const CREATE_NO_WINDOW: u32 = 0x08000000;

            cmd.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
        }

        let child = cmd.spawn().map_err(|e| IntrigError::DaemonStartFailed {
            project: metadata.project_name.clone(),
            reason: format!("could not spawn '{}': {}", program, e),
        })?;

        info!(
            "spawned daemon for {} (pid {}) in {}",
            metadata.project_name,
            child.id(),
            metadata.path.display()
        );

        // Fire-and-forget: ownership of the process transfers to the OS
        // here. The handle is dropped without waiting; the client only ever
        // observes the daemon through its port.
        drop(child);
        Ok(())
    }
}

/// Orchestrates resolve, probe, spawn, and readiness polling.
pub struct LifecycleController {
    resolver: Resolver,
    probe: LivenessProbe,
    spawner: Box<dyn DaemonSpawner>,
    poll_interval: Duration,
    startup_timeout: Duration,
}

impl LifecycleController {
    pub fn new(store: RegistryStore, config: &ClientConfig) -> Self {
        Self {
            resolver: Resolver::new(store),
            probe: LivenessProbe::with_timeout(config.probe_timeout()),
            spawner: Box::new(CommandSpawner::new(config.resolved_daemon_command())),
            poll_interval: config.poll_interval(),
            startup_timeout: config.startup_timeout(),
        }
    }

    /// Replace the process spawner (tests, embedders with their own start
    /// strategy).
    pub fn with_spawner(mut self, spawner: Box<dyn DaemonSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Override the readiness polling cadence and budget.
    pub fn with_timing(mut self, poll_interval: Duration, startup_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.startup_timeout = startup_timeout;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn probe(&self) -> &LivenessProbe {
        &self.probe
    }

    /// Resolve the project containing `path` and return it ready, starting
    /// its daemon if needed.
    pub async fn get_project(&self, path: &Path) -> Result<ProjectInfo> {
        let metadata = self
            .resolver
            .resolve_by_path(path)?
            .ok_or_else(|| IntrigError::ProjectNotFound(path.display().to_string()))?;
        self.ensure_ready(metadata).await
    }

    /// Resolve by path-or-name, then re-run the full readiness sequence
    /// keyed by the resolved project root.
    ///
    /// The record's URL is never trusted directly: only the probe (and a
    /// spawn, if the probe fails) decides whether the instance is usable.
    pub async fn get_project_by_identifier(&self, identifier: &str) -> Result<ProjectInfo> {
        let metadata = self
            .resolver
            .resolve_identifier(identifier)?
            .ok_or_else(|| IntrigError::ProjectNotFound(identifier.to_string()))?;
        let root = metadata.path.clone();
        self.get_project(&root).await
    }

    async fn ensure_ready(&self, metadata: DiscoveryMetadata) -> Result<ProjectInfo> {
        if self.probe.is_daemon_running(&metadata).await {
            debug!("daemon for {} already running", metadata.project_name);
            return Ok(ProjectInfo::from_metadata(metadata, true));
        }

        info!(
            "daemon for {} not running, starting it",
            metadata.project_name
        );
        self.spawner.spawn(&metadata)?;

        if self
            .wait_for_daemon_ready(metadata.port, self.startup_timeout, self.poll_interval)
            .await
        {
            Ok(ProjectInfo::from_metadata(metadata, true))
        } else {
            Err(IntrigError::DaemonStartFailed {
                project: metadata.project_name,
                reason: format!(
                    "started but not ready within {}ms",
                    self.startup_timeout.as_millis()
                ),
            })
        }
    }

    /// Poll the port at `poll_interval` until it is live or `max_wait` has
    /// fully elapsed. Returns `true` at the first live reading.
    pub async fn wait_for_daemon_ready(
        &self,
        port: u16,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> bool {
        let deadline = Instant::now() + max_wait;
        loop {
            if self.probe.is_port_in_use(port).await {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            // Never oversleep past the deadline; the last probe runs at the
            // end of the budget.
            sleep(poll_interval.min(deadline - now)).await;
        }
    }
}
