//! Routing policy
//!
//! Chooses an ordered list of delivery channels for a recipient based on
//! the kind of entity it is and whether it is directly connected.

mod error;
mod policy;
mod types;

pub use error::{RoutingError, RoutingResult};
pub use policy::RoutingPolicy;
pub use types::{Channel, ChannelKind, RoutingDecision};
