//! Change detection and regeneration against a resolved daemon.
//!
//! Build-tool hooks sit here: before a build, ask the daemon whether the
//! generated artifacts still match the cached content hashes; if not (or if
//! nothing is cached), drive a regeneration and relay its streamed progress.
//!
//! ## Components
//!
//! - [`client`]: HTTP client for the daemon's verify/generate endpoints
//! - [`sse`]: incremental framing for the streamed progress events
//! - [`trigger`]: the decide-and-regenerate orchestration

pub mod client;
pub mod sse;
pub mod trigger;

pub use client::DaemonApi;
pub use sse::SseParser;
pub use trigger::{ChangeDetector, SyncOutcome};
