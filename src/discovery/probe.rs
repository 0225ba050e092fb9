//! TCP-connect liveness checks.
//!
//! Registry records are only hints; the probe is the source of truth for
//! whether a daemon is actually running. A bare connect to the loopback
//! port is enough, no payload is exchanged.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

use intrig_types::DiscoveryMetadata;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Liveness prober with an injectable connect timeout.
#[derive(Debug, Clone)]
pub struct LivenessProbe {
    timeout: Duration,
}

impl LivenessProbe {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Check whether anything accepts TCP connections on `127.0.0.1:port`.
    ///
    /// Every failure mode (refused, timeout, no permission) yields `false`.
    /// This never errors.
    pub async fn is_port_in_use(&self, port: u16) -> bool {
        let connect = TcpStream::connect(("127.0.0.1", port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("TCP probe failed for port {}: {}", port, e);
                false
            }
            Err(_) => {
                debug!("TCP probe timed out for port {}", port);
                false
            }
        }
    }

    /// A daemon counts as running iff its recorded port is in use.
    pub async fn is_daemon_running(&self, metadata: &DiscoveryMetadata) -> bool {
        self.is_port_in_use(metadata.port).await
    }
}

impl Default for LivenessProbe {
    fn default() -> Self {
        Self::new()
    }
}
