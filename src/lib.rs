//! intrig - client-side coordination with per-project daemons.
//!
//! Each intrig project runs one background daemon that serves generated
//! client code over HTTP. This crate is everything around that black box:
//! finding instances through a filesystem registry, probing whether they are
//! actually alive, starting them on demand, registering a daemon's own
//! record from inside the daemon process, and deciding via content hashes
//! whether a regeneration needs to run.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod output;
pub mod sync;

pub use error::{IntrigError, Result};
