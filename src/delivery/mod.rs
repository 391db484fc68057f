//! Delivery status tracking
//!
//! Each message moves through `Queued -> Routing -> {Delivered, Failed}` or
//! directly `Queued -> Delivered`. Routed messages resolve on a simulated
//! channel after a fixed delay.

mod error;
mod simulator;
mod state_machine;
mod types;

pub use error::{DeliveryError, DeliveryResult};
pub use simulator::DeliverySimulator;
pub use state_machine::DeliveryTracker;
pub use types::{ChannelCounts, DeliveryState, DeliveryStats, DeliveryStatus};
