//! Daemon discovery and lifecycle coordination.
//!
//! Every intrig daemon publishes a small JSON record about itself in a
//! per-user registry directory; clients find daemons by scanning that
//! directory and never trust a record without probing the recorded port.
//!
//! ## Components
//!
//! - [`registry`]: reads/writes per-instance metadata files
//! - [`probe`]: TCP-connect liveness checks
//! - [`resolver`]: maps a path or project name to a registry record
//! - [`lifecycle`]: auto-start and readiness polling on top of the above
//! - [`registration`]: daemon-side self-registration hook

pub mod lifecycle;
pub mod probe;
pub mod registration;
pub mod registry;
pub mod resolver;

pub use lifecycle::{CommandSpawner, DaemonSpawner, LifecycleController};
pub use probe::LivenessProbe;
pub use registration::{RegistrationHandle, register};
pub use registry::RegistryStore;
pub use resolver::Resolver;
