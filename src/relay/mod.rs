//! Message relay
//!
//! Accepts messages from connected clients, persists them, forwards them to
//! present recipients and hands everything else to the delivery tracker for
//! simulated routing.

pub mod node;
pub mod session;
pub mod types;

pub use node::{MessageRelay, MessageRelayBuilder};
pub use session::Session;
pub use types::{
    ChannelStatsEntry, ChannelStatsReport, RelayError, RelayResult, RelayStats, SubmitOutcome,
};
