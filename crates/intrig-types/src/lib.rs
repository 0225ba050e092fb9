//! Shared types for intrig daemon discovery.
//!
//! These types describe the on-disk registry record each daemon instance
//! publishes about itself and the wire events streamed during regeneration.
//! They are used by the intrig CLI, by build-tool plugins, and by daemon-side
//! framework bindings that only need to register themselves without pulling
//! in the full client.

pub mod event;
pub mod metadata;
pub mod name;

pub use event::*;
pub use metadata::*;
pub use name::*;
