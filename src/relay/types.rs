//! Relay types and errors

use crate::delivery::DeliveryError;
use crate::identity::IdentityError;
use crate::protocol::{AckStatus, FrameError};
use crate::routing::{Channel, ChannelKind, RoutingError};
use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Relay-specific errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    MalformedFrame(#[from] FrameError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelayError {
    /// Unknown message id or unknown identifier
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RelayError::Identity(IdentityError::Unknown(_))
                | RelayError::Delivery(DeliveryError::NotFound(_))
                | RelayError::Store(StoreError::NotFound(_))
        )
    }

    /// Identifier without the minimum structure
    pub fn is_malformed_identifier(&self) -> bool {
        matches!(
            self,
            RelayError::Identity(IdentityError::Malformed(_)) | RelayError::Routing(_)
        )
    }
}

/// What happened to a submitted message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub message_id: Uuid,
    pub status: AckStatus,
}

/// Counters for one channel
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatsEntry {
    pub name: Channel,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    /// `online` for direct connections, `simulated` for the fallback channels
    pub availability: &'static str,
    pub active_connections: usize,
    pub messages_sent: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// Aggregate per-channel statistics
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatsReport {
    pub channels: Vec<ChannelStatsEntry>,
    pub total_messages: usize,
    pub delivered_messages: u64,
    pub failed_messages: u64,
    pub routing_messages: u64,
}

impl ChannelStatsReport {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelStatsEntry> {
        self.channels.iter().find(|c| c.name == channel)
    }
}

/// Relay-level counters not derivable from the store or tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub frames_received: u64,
    pub frames_rejected: u64,
    pub send_failures: u64,
    pub pings: u64,
}

impl std::fmt::Display for RelayStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Relay: {} frames, {} rejected, {} send failures",
            self.frames_received, self.frames_rejected, self.send_failures
        )
    }
}

pub(crate) fn availability(channel: Channel) -> &'static str {
    if channel.is_simulated() {
        "simulated"
    } else {
        "online"
    }
}
