//! Client configuration for discovery and sync timing.
//!
//! Manages the config file at `~/.intrig/config.toml`. Every knob has a
//! default, so a missing file is never an error; a partial file only
//! overrides the keys it names.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IntrigError, Result};

/// Timing and process knobs for the client side of the protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cadence of the readiness polling loop, in milliseconds.
    pub poll_interval_ms: u64,
    /// Overall deadline for a spawned daemon to become reachable.
    pub startup_timeout_ms: u64,
    /// TCP connect timeout for a single liveness probe.
    pub probe_timeout_ms: u64,
    /// How many times a 5xx response to `verify` is retried.
    pub verify_retries: u32,
    /// Fixed delay between those retries.
    pub retry_delay_ms: u64,
    /// Overall bound on a streamed generate call.
    pub stream_timeout_secs: u64,
    /// Command used to start a project's daemon, run from the project root.
    pub daemon_command: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            startup_timeout_ms: 10_000,
            probe_timeout_ms: 1_000,
            verify_retries: 2,
            retry_delay_ms: 500,
            stream_timeout_secs: 300,
            daemon_command: vec![
                "npx".to_string(),
                "intrig".to_string(),
                "daemon".to_string(),
            ],
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    /// The daemon start command, with the `INTRIG_DAEMON_COMMAND` environment
    /// variable (whitespace-split) taking precedence over the config file.
    pub fn resolved_daemon_command(&self) -> Vec<String> {
        if let Ok(raw) = std::env::var("INTRIG_DAEMON_COMMAND") {
            let parts: Vec<String> = raw.split_whitespace().map(String::from).collect();
            if !parts.is_empty() {
                return parts;
            }
        }
        self.daemon_command.clone()
    }
}

/// Get the intrig config directory (~/.intrig)
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".intrig"))
        .ok_or_else(|| IntrigError::Config("Could not determine home directory".into()))
}

/// Get the path to the config file (~/.intrig/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the configuration from ~/.intrig/config.toml.
/// Returns defaults if the file doesn't exist.
pub fn load() -> Result<ClientConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| IntrigError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Save the configuration to ~/.intrig/config.toml
pub fn save(config: &ClientConfig) -> Result<()> {
    let path = config_path()?;

    // Ensure the directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| IntrigError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(&path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.startup_timeout(), Duration::from_secs(10));
        assert_eq!(config.verify_retries, 2);
        assert_eq!(config.stream_timeout(), Duration::from_secs(300));
        assert_eq!(config.daemon_command, vec!["npx", "intrig", "daemon"]);
    }

    #[test]
    fn test_partial_toml_overrides_only_named_keys() {
        let config: ClientConfig = toml::from_str("poll_interval_ms = 50").unwrap();
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.startup_timeout_ms, 10_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ClientConfig {
            verify_retries: 5,
            ..ClientConfig::default()
        };
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.verify_retries, 5);
        assert_eq!(parsed.daemon_command, config.daemon_command);
    }

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.is_ok());
        assert!(dir.unwrap().ends_with(".intrig"));
    }
}
