use crate::routing::Channel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Queued,
    Routing,
    Delivered,
    Failed,
}

impl DeliveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryState::Delivered | DeliveryState::Failed)
    }

    pub fn can_transition_to(&self, next: DeliveryState) -> bool {
        matches!(
            (self, next),
            (DeliveryState::Queued, DeliveryState::Routing)
                | (DeliveryState::Queued, DeliveryState::Delivered)
                | (DeliveryState::Routing, DeliveryState::Delivered)
                | (DeliveryState::Routing, DeliveryState::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Queued => "queued",
            DeliveryState::Routing => "routing",
            DeliveryState::Delivered => "delivered",
            DeliveryState::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current delivery status of one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    pub message_id: Uuid,
    #[serde(rename = "status")]
    pub state: DeliveryState,
    #[serde(rename = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "details", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
}

impl DeliveryStatus {
    pub fn queued(message_id: Uuid) -> Self {
        Self {
            message_id,
            state: DeliveryState::Queued,
            updated_at: Utc::now(),
            detail: None,
            channel: None,
        }
    }
}

/// Per-channel outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelCounts {
    /// Messages assigned to this channel
    pub messages: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// Aggregate delivery counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub queued: u64,
    pub routing: u64,
    pub delivered: u64,
    pub failed: u64,
    pub by_channel: BTreeMap<Channel, ChannelCounts>,
}

impl DeliveryStats {
    pub fn total(&self) -> u64 {
        self.queued + self.routing + self.delivered + self.failed
    }

    pub fn channel(&self, channel: Channel) -> ChannelCounts {
        self.by_channel.get(&channel).copied().unwrap_or_default()
    }

    /// Share of terminal messages that were delivered, in percent
    pub fn success_rate(&self) -> f64 {
        let terminal = self.delivered + self.failed;
        if terminal == 0 {
            return 100.0;
        }
        self.delivered as f64 / terminal as f64 * 100.0
    }
}

impl fmt::Display for DeliveryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Delivery: {} delivered, {} failed ({:.1}% success), {} routing, {} queued",
            self.delivered,
            self.failed,
            self.success_rate(),
            self.routing,
            self.queued
        )
    }
}
