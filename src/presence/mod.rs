//! Presence tracking
//!
//! Maps each identifier to the single live connection it currently holds.
//! A new connection for the same identifier replaces the old one.

mod error;
mod registry;

pub use error::{PresenceError, PresenceResult};
pub use registry::{ConnectionHandle, PresenceRegistry};
