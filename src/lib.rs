//! Maritime message relay
//!
//! Connected vessels, shore stations and services exchange messages through
//! the relay. Messages for a connected recipient are forwarded immediately;
//! the rest are routed over a simulated radio, satellite or internet channel
//! chosen from the recipient's entity type.

pub mod api;
pub mod config;
pub mod delivery;
pub mod identity;
pub mod logging;
pub mod metrics;
pub mod presence;
pub mod protocol;
pub mod relay;
pub mod routing;
pub mod store;

pub use config::{ConfigError, LogFormat, RelayConfig};
pub use relay::{MessageRelay, MessageRelayBuilder, RelayError, RelayResult};
