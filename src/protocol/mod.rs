//! Wire frames exchanged over a relay connection
//!
//! Inbound text is decoded into a closed set of frames at the boundary.
//! Anything that does not match a known shape is rejected before it reaches
//! the message pipeline.

mod error;
mod frame;
mod types;

pub use error::{FrameError, FrameResult};
pub use frame::{InboundFrame, MessageFrame};
pub use types::{AckStatus, DeliveredMessage, MessageType, OutboundFrame, Priority};
